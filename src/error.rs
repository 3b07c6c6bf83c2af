//! Error types for the proposal wizard.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors loading the reference-data catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// A single field-level validation failure reported by a collector or picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Local validation failures. These block a submission and never reach the
/// wizard state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single-field failure.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message for a field, if that field failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Field → message map, for JSON responses.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .map(|e| (e.field.clone(), e.message.clone()))
            .collect()
    }

    /// `Ok(())` when nothing failed, otherwise `Err(self)`.
    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Remote generation failures. Each one is surfaced to the user as a single
/// message via `Display`.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClientBuild(String),

    #[error("Request to {provider} failed: {reason}")]
    Transport { provider: String, reason: String },

    #[error("{provider} returned HTTP {status}: {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} returned no proposal text")]
    EmptyResponse { provider: String },

    #[error("The AI service returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("The AI service response is missing required field '{field}'")]
    SchemaViolation { field: String },

    #[error("Proposal generation timed out after {0:?}")]
    Timeout(Duration),
}

/// Events the state machine rejected. A rejected event never mutates state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Cannot {event} while in step {step}")]
    InvalidTransition { step: String, event: String },

    #[error("Submitted {submitted} input but the wizard is collecting {expected} input")]
    ModeMismatch { expected: String, submitted: String },

    #[error("No proposal is ready")]
    NoProposal,

    #[error("Wizard {0} not found")]
    NotFound(String),
}

/// Document export failures, local to the renderer.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Typst compilation failed: {0}")]
    Compile(String),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("Export worker failed: {0}")]
    Join(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
