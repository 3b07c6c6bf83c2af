//! REST endpoints for wizard sessions.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::collectors::{CollectorInput, InputMode};
use crate::config::BrandConfig;
use crate::error::{Error, WizardError};

use super::controller::WizardController;
use super::registry::WizardRegistry;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<WizardRegistry>,
    pub brand: Arc<BrandConfig>,
}

/// Build the wizard REST routes.
pub fn wizard_routes(registry: Arc<WizardRegistry>, brand: BrandConfig) -> Router {
    let state = AppState {
        registry,
        brand: Arc::new(brand),
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/catalog", get(get_catalog))
        .route("/api/wizards", post(create_wizard))
        .route("/api/wizards/{id}", get(get_wizard).delete(delete_wizard))
        .route("/api/wizards/{id}/industry", post(select_industry))
        .route("/api/wizards/{id}/mode", post(choose_mode))
        .route("/api/wizards/{id}/submit", post(submit))
        .route("/api/wizards/{id}/back", post(back))
        .route("/api/wizards/{id}/restart", post(restart))
        .route("/api/wizards/{id}/proposal", get(get_proposal))
        .route("/api/wizards/{id}/proposal.pdf", get(get_proposal_pdf))
        .with_state(state)
}

// ── Errors ──────────────────────────────────────────────────────────────

/// Maps crate errors onto HTTP statuses.
pub struct ApiError(Error);

impl<E: Into<Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        match self.0 {
            Error::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({
                    "error": "Validation failed",
                    "fields": errors.to_map(),
                })),
            )
                .into_response(),
            Error::Wizard(WizardError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": message }))).into_response()
            }
            Error::Wizard(_) => {
                (StatusCode::CONFLICT, Json(serde_json::json!({ "error": message }))).into_response()
            }
            _ => {
                error!(error = %message, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": message })),
                )
                    .into_response()
            }
        }
    }
}

async fn lookup(state: &AppState, id: Uuid) -> Result<Arc<WizardController>, ApiError> {
    state.registry.get(id).await.ok_or_else(|| {
        warn!(wizard_id = %id, "Unknown wizard");
        ApiError::from(WizardError::NotFound(id.to_string()))
    })
}

// ── Health & reference data ─────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "proposal-wizard"
    }))
}

async fn get_catalog(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.registry.catalog().clone())
}

// ── Sessions ────────────────────────────────────────────────────────────

async fn create_wizard(State(state): State<AppState>) -> impl IntoResponse {
    let wizard = state.registry.create().await;
    (StatusCode::CREATED, Json(wizard.snapshot().await))
}

async fn get_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let wizard = lookup(&state, id).await?;
    Ok(Json(wizard.snapshot().await))
}

async fn delete_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.registry.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(WizardError::NotFound(id.to_string()).into())
    }
}

// ── Steps ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndustryRequest {
    industry: String,
    sub_industry: String,
}

async fn select_industry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<IndustryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let wizard = lookup(&state, id).await?;
    let snapshot = wizard.select_industry(&body.industry, &body.sub_industry).await?;
    Ok(Json(snapshot))
}

#[derive(Deserialize)]
struct ModeRequest {
    mode: InputMode,
}

async fn choose_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ModeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let wizard = lookup(&state, id).await?;
    Ok(Json(wizard.choose_mode(body.mode).await?))
}

/// Accepted immediately; poll the session for the outcome.
async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CollectorInput>,
) -> Result<impl IntoResponse, ApiError> {
    let wizard = lookup(&state, id).await?;
    let ticket = wizard.submit(input).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "requestId": ticket.request_id,
            "step": "generating",
        })),
    ))
}

async fn back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let wizard = lookup(&state, id).await?;
    Ok(Json(wizard.back().await?))
}

async fn restart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let wizard = lookup(&state, id).await?;
    Ok(Json(wizard.restart().await))
}

// ── Proposal ────────────────────────────────────────────────────────────

async fn get_proposal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let wizard = lookup(&state, id).await?;
    Ok(Json(wizard.proposal_view(&state.brand).await?))
}

async fn get_proposal_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let wizard = lookup(&state, id).await?;
    let document = wizard.export_pdf(&state.brand).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&document.file_name),
            ),
        ],
        document.bytes,
    ))
}

/// `attachment` disposition with the file name as a quoted-string.
/// Quotes and backslashes are escaped; anything outside printable ASCII
/// becomes `_` so the header value stays valid.
fn content_disposition(file_name: &str) -> String {
    let mut quoted = String::with_capacity(file_name.len());
    for c in file_name.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            ' '..='~' => quoted.push(c),
            _ => quoted.push('_'),
        }
    }
    format!("attachment; filename=\"{quoted}\"")
}
