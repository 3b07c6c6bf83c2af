//! Gemini `generateContent` client.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::ProposalGateway;
use super::prompts::{parse_proposal, proposal_prompt, response_schema};
use crate::config::{BrandConfig, GatewayConfig};
use crate::error::GatewayError;
use crate::profile::{CustomerProfile, Proposal};

const PROVIDER: &str = "gemini";
/// Longest upstream error body carried into a user-facing error.
const MAX_ERROR_BODY_CHARS: usize = 200;

pub struct GeminiGateway {
    http: reqwest::Client,
    config: GatewayConfig,
    brand: BrandConfig,
}

impl GeminiGateway {
    pub fn new(config: GatewayConfig, brand: BrandConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("proposal-wizard/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| GatewayError::HttpClientBuild(e.to_string()))?;
        tracing::info!("Using Gemini (model: {})", config.model);
        Ok(Self {
            http,
            config,
            brand,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn send(&self, body: &GenerateRequest<'_>) -> Result<String, GatewayError> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| GatewayError::Transport {
            provider: PROVIDER.to_string(),
            reason: e.to_string(),
        })?;
        if !status.is_success() {
            warn!(status = status.as_u16(), body = %text, "Gemini request rejected");
            return Err(GatewayError::Api {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl ProposalGateway for GeminiGateway {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(&self, profile: &CustomerProfile) -> Result<Proposal, GatewayError> {
        let prompt = proposal_prompt(profile, &self.brand);
        let body = GenerateRequest::new(&prompt, self.config.temperature);
        debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending proposal generation request"
        );

        let raw = self.send(&body).await?;
        let text = extract_text(&raw)?;
        parse_proposal(&text)
    }
}

// ── Wire types ──────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str, temperature: f32) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
                temperature,
            },
        }
    }
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn extract_text(raw: &str) -> Result<String, GatewayError> {
    let response: GenerateResponse =
        serde_json::from_str(raw).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(GatewayError::EmptyResponse {
            provider: PROVIDER.to_string(),
        });
    }
    Ok(text)
}

/// First line of an error body, cut to a readable length.
fn truncate_body(body: &str) -> String {
    let line = body.trim().lines().next().unwrap_or_default();
    let mut chars = line.chars();
    let head: String = chars.by_ref().take(MAX_ERROR_BODY_CHARS).collect();
    if chars.next().is_some() || line.len() < body.trim().len() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use tokio::net::TcpListener;

    use super::*;
    use crate::profile::{IndustrySelection, PartialProfile};

    fn profile() -> CustomerProfile {
        CustomerProfile::merge(
            &IndustrySelection::new("Healthcare", "Telehealth"),
            PartialProfile {
                notes: Some("Patients drop off after the first visit".into()),
                ..Default::default()
            },
        )
    }

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://127.0.0.1:{port}")
    }

    fn gateway(base_url: String) -> GeminiGateway {
        let mut config = GatewayConfig::new("test-key");
        config.base_url = base_url;
        GeminiGateway::new(config, BrandConfig::default()).unwrap()
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateRequest::new("hello", 0.5);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
        assert_eq!(
            json["generationConfig"]["responseSchema"]["required"],
            serde_json::json!(["solutions", "summary"])
        );
    }

    #[test]
    fn extract_text_joins_parts() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"solutions\": [],"}, {"text": " \"summary\": \"s\"}"}]},
                "finishReason": "STOP"
            }]
        })
        .to_string();
        assert_eq!(extract_text(&raw).unwrap(), "{\"solutions\": [], \"summary\": \"s\"}");
    }

    #[test]
    fn extract_text_without_candidates_is_empty_response() {
        let raw = serde_json::json!({"candidates": []}).to_string();
        assert!(matches!(
            extract_text(&raw),
            Err(GatewayError::EmptyResponse { .. })
        ));
        assert!(matches!(
            extract_text("<html>"),
            Err(GatewayError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn generate_round_trip_against_local_server() {
        let app = Router::new().route(
            "/models/{model}",
            post(|headers: HeaderMap, body: String| async move {
                assert_eq!(headers["x-goog-api-key"], "test-key");
                assert!(body.contains("Telehealth"));
                let proposal = serde_json::json!({
                    "solutions": [{"serviceName": "Zoho Desk", "outcomes": ["Resolve tickets in one place"]}],
                    "summary": "A calmer support desk."
                });
                axum::Json(serde_json::json!({
                    "candidates": [{"content": {"parts": [{"text": proposal.to_string()}]}}]
                }))
            }),
        );
        let base = serve(app).await;

        let proposal = gateway(base).generate(&profile()).await.unwrap();
        assert_eq!(proposal.solutions[0].service_name, "Zoho Desk");
        assert_eq!(proposal.summary, "A calmer support desk.");
    }

    #[tokio::test]
    async fn http_errors_surface_status_and_body() {
        let app = Router::new().route(
            "/models/{model}",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model overloaded").into_response() }),
        );
        let base = serve(app).await;

        let err = gateway(base).generate(&profile()).await.unwrap_err();
        match err {
            GatewayError::Api { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "model overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn long_error_bodies_are_cut_short() {
        let page = format!("<html>{}</html>\n<body>stack trace</body>", "x".repeat(5_000));
        let app = Router::new().route(
            "/models/{model}",
            post(move || {
                let page = page.clone();
                async move { (StatusCode::BAD_GATEWAY, page).into_response() }
            }),
        );
        let base = serve(app).await;

        let err = gateway(base).generate(&profile()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("gemini returned HTTP 502: <html>xxx"));
        assert!(message.ends_with("..."));
        assert!(!message.contains("stack trace"));
        assert!(message.len() < 300);
    }

    #[test]
    fn truncate_body_keeps_short_single_lines() {
        assert_eq!(truncate_body("  quota exceeded \n"), "quota exceeded");
        assert_eq!(truncate_body("first\nsecond"), "first...");
        assert_eq!(truncate_body(""), "");
        let long = "é".repeat(MAX_ERROR_BODY_CHARS + 1);
        assert_eq!(truncate_body(&long).chars().count(), MAX_ERROR_BODY_CHARS + 3);
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let err = gateway("http://127.0.0.1:1".into())
            .generate(&profile())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport { .. }));
    }
}
