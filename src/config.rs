//! Configuration types, read from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 90;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
pub const DEFAULT_SESSION_SWEEP_SECS: u64 = 60;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Optional replacement for the built-in discovery catalog.
    pub catalog_path: Option<PathBuf>,
    /// Upper bound on one generation request, after which the wizard returns
    /// to input with an error.
    pub generation_timeout: Duration,
    /// Sessions untouched for this long are dropped.
    pub session_ttl: Duration,
    /// How often idle sessions are swept.
    pub session_sweep_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            catalog_path: None,
            generation_timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            session_sweep_interval: Duration::from_secs(DEFAULT_SESSION_SWEEP_SECS),
        }
    }
}

impl AppConfig {
    /// - `PROPOSAL_WIZARD_PORT` (default 8080)
    /// - `PROPOSAL_WIZARD_CATALOG`: path to a catalog JSON file
    /// - `PROPOSAL_WIZARD_GENERATION_TIMEOUT_SECS` (default 90)
    /// - `PROPOSAL_WIZARD_SESSION_TTL_SECS` (default 3600)
    /// - `PROPOSAL_WIZARD_SESSION_SWEEP_SECS` (default 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env_parse("PROPOSAL_WIZARD_PORT", DEFAULT_PORT)?;
        let catalog_path = std::env::var("PROPOSAL_WIZARD_CATALOG")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            port,
            catalog_path,
            generation_timeout: env_secs(
                "PROPOSAL_WIZARD_GENERATION_TIMEOUT_SECS",
                DEFAULT_GENERATION_TIMEOUT_SECS,
            )?,
            session_ttl: env_secs("PROPOSAL_WIZARD_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?,
            session_sweep_interval: env_secs(
                "PROPOSAL_WIZARD_SESSION_SWEEP_SECS",
                DEFAULT_SESSION_SWEEP_SECS,
            )?,
        })
    }
}

/// Remote generation gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Required:
    /// - `GEMINI_API_KEY`
    ///
    /// Optional:
    /// - `GEMINI_MODEL` (default `gemini-2.5-flash`)
    /// - `GEMINI_BASE_URL`
    /// - `GEMINI_REQUEST_TIMEOUT_SECS` (default 120)
    /// - `GEMINI_CONNECT_TIMEOUT_SECS` (default 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("GEMINI_API_KEY".into()))?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        config.request_timeout = Duration::from_secs(env_parse(
            "GEMINI_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        config.connect_timeout = Duration::from_secs(env_parse(
            "GEMINI_CONNECT_TIMEOUT_SECS",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?);
        Ok(config)
    }
}

/// Branding used in prompts, rendered proposals, and exported documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandConfig {
    /// Heading shown at the top of the proposal.
    pub title: String,
    /// Label in the header band of every exported page.
    pub header_label: String,
    /// Label in the footer band of every exported page.
    pub footer_label: String,
    /// Exported file name prefix.
    pub file_prefix: String,
    /// Products the consultant prompt may recommend.
    pub products: Vec<String>,
    /// Suite recommended when needs are broad.
    pub suite: String,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            title: "Zoho One Proposal".to_string(),
            header_label: "ZOHO One Proposal".to_string(),
            footer_label: "Zoho One Credibility Engine".to_string(),
            file_prefix: "Zoho_One_Proposal".to_string(),
            products: [
                "Zoho CRM",
                "Zoho Desk",
                "Zoho Inventory",
                "Zoho Books",
                "Zoho Workplace",
                "Zoho Sites",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            suite: "Zoho One".to_string(),
        }
    }
}

impl BrandConfig {
    /// Defaults with `PROPOSAL_BRAND_TITLE`, `PROPOSAL_BRAND_HEADER`,
    /// `PROPOSAL_BRAND_FOOTER`, `PROPOSAL_BRAND_FILE_PREFIX`,
    /// `PROPOSAL_BRAND_SUITE` and `PROPOSAL_BRAND_PRODUCTS` (comma-separated)
    /// applied on top.
    pub fn from_env() -> Self {
        let mut brand = Self::default();
        let overrides = [
            ("PROPOSAL_BRAND_TITLE", &mut brand.title),
            ("PROPOSAL_BRAND_HEADER", &mut brand.header_label),
            ("PROPOSAL_BRAND_FOOTER", &mut brand.footer_label),
            ("PROPOSAL_BRAND_FILE_PREFIX", &mut brand.file_prefix),
            ("PROPOSAL_BRAND_SUITE", &mut brand.suite),
        ];
        for (key, field) in overrides {
            if let Ok(value) = std::env::var(key) {
                if !value.trim().is_empty() {
                    *field = value;
                }
            }
        }
        if let Ok(products) = std::env::var("PROPOSAL_BRAND_PRODUCTS") {
            let products: Vec<String> = products
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !products.is_empty() {
                brand.products = products;
            }
        }
        brand
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse '{raw}'"),
        }),
        Err(_) => Ok(default),
    }
}

/// A non-zero number of seconds.
fn env_secs(key: &str, default: u64) -> Result<Duration, ConfigError> {
    match env_parse(key, default)? {
        0 => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".into(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}
