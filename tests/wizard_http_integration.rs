//! Integration tests for the wizard REST surface.
//!
//! Each test spins up an Axum server on a random port with a stub gateway
//! and drives it over real HTTP with reqwest.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use proposal_wizard::catalog::DiscoveryCatalog;
use proposal_wizard::config::BrandConfig;
use proposal_wizard::error::GatewayError;
use proposal_wizard::gateway::ProposalGateway;
use proposal_wizard::profile::{CustomerProfile, Proposal, ProposalSolution};
use proposal_wizard::wizard::{WizardRegistry, wizard_routes};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Echoes the meeting notes back as the summary. Notes starting with
/// "slow" take a while; notes starting with "fail" fail.
struct StubGateway;

#[async_trait]
impl ProposalGateway for StubGateway {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(&self, profile: &CustomerProfile) -> Result<Proposal, GatewayError> {
        let notes = profile.notes.clone().unwrap_or_default();
        if notes.starts_with("slow") {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        if notes.starts_with("fail") {
            return Err(GatewayError::MalformedResponse("not JSON".into()));
        }
        Ok(Proposal {
            solutions: vec![ProposalSolution {
                service_name: "Zoho One".into(),
                outcomes: vec!["Run the whole business on one platform".into()],
            }],
            summary: notes,
        })
    }
}

/// Start an Axum server on a random port, return its base URL.
async fn start_server() -> String {
    let registry = WizardRegistry::new(
        Arc::new(StubGateway),
        Arc::new(DiscoveryCatalog::builtin().unwrap()),
        Duration::from_secs(5),
    );
    let app = wizard_routes(registry, BrandConfig::default());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{port}")
}

async fn post(client: &reqwest::Client, url: String, body: Value) -> (u16, Value) {
    let resp = client.post(url).json(&body).send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap_or(Value::Null))
}

async fn get(client: &reqwest::Client, url: String) -> (u16, Value) {
    let resp = client.get(url).send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap_or(Value::Null))
}

/// Create a wizard and walk it to freeform input.
async fn wizard_at_input(client: &reqwest::Client, base: &str) -> String {
    let (status, body) = post(client, format!("{base}/api/wizards"), json!({})).await;
    assert_eq!(status, 201);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = post(
        client,
        format!("{base}/api/wizards/{id}/industry"),
        json!({"industry": "Retail", "subIndustry": "Brick & Mortar"}),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = post(
        client,
        format!("{base}/api/wizards/{id}/mode"),
        json!({"mode": "freeform"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["step"], "input_data");
    id
}

async fn wait_for(client: &reqwest::Client, base: &str, id: &str, step: &str) -> Value {
    loop {
        let (_, body) = get(client, format!("{base}/api/wizards/{id}")).await;
        if body["step"] == step {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn freeform_flow_produces_downloadable_proposal() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let id = wizard_at_input(&client, &base).await;

        let (status, body) = post(
            &client,
            format!("{base}/api/wizards/{id}/submit"),
            json!({"mode": "freeform", "notes": "Footfall is down", "currentTools": "Excel"}),
        )
        .await;
        assert_eq!(status, 202);
        assert_eq!(body["requestId"], 1);

        let snapshot = wait_for(&client, &base, &id, "proposal_ready").await;
        assert_eq!(snapshot["proposal"]["summary"], "Footfall is down");
        assert!(snapshot["error"].is_null());

        let resp = client
            .get(format!("{base}/api/wizards/{id}/proposal.pdf"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(
            resp.headers()["content-disposition"],
            "attachment; filename=\"Zoho_One_Proposal_Brick_&_Mortar.pdf\""
        );
        let bytes = resp.bytes().await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn failed_generation_keeps_input_and_shows_error() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let id = wizard_at_input(&client, &base).await;

        post(
            &client,
            format!("{base}/api/wizards/{id}/submit"),
            json!({"mode": "freeform", "notes": "fail please"}),
        )
        .await;

        let snapshot = wait_for(&client, &base, &id, "input_data").await;
        assert!(snapshot["error"].as_str().unwrap().contains("malformed"));
        assert_eq!(snapshot["draft"]["notes"], "fail please");
        assert!(snapshot["proposal"].is_null());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn superseded_request_never_lands() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let id = wizard_at_input(&client, &base).await;

        let (_, first) = post(
            &client,
            format!("{base}/api/wizards/{id}/submit"),
            json!({"mode": "freeform", "notes": "slow first"}),
        )
        .await;
        let (status, _) = post(&client, format!("{base}/api/wizards/{id}/back"), json!({})).await;
        assert_eq!(status, 200);

        let (_, second) = post(
            &client,
            format!("{base}/api/wizards/{id}/submit"),
            json!({"mode": "freeform", "notes": "fast second"}),
        )
        .await;
        assert!(second["requestId"].as_u64() > first["requestId"].as_u64());

        let snapshot = wait_for(&client, &base, &id, "proposal_ready").await;
        assert_eq!(snapshot["proposal"]["summary"], "fast second");

        // Let the slow request finish; it must not overwrite anything.
        tokio::time::sleep(Duration::from_millis(400)).await;
        let (_, snapshot) = get(&client, format!("{base}/api/wizards/{id}")).await;
        assert_eq!(snapshot["step"], "proposal_ready");
        assert_eq!(snapshot["proposal"]["summary"], "fast second");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn resubmit_while_generating_supersedes_slow_request() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let id = wizard_at_input(&client, &base).await;

        let (status, first) = post(
            &client,
            format!("{base}/api/wizards/{id}/submit"),
            json!({"mode": "freeform", "notes": "slow first"}),
        )
        .await;
        assert_eq!(status, 202);

        let (status, second) = post(
            &client,
            format!("{base}/api/wizards/{id}/submit"),
            json!({"mode": "freeform", "notes": "fast second"}),
        )
        .await;
        assert_eq!(status, 202);
        assert_eq!(second["requestId"].as_u64(), first["requestId"].as_u64().map(|n| n + 1));

        let snapshot = wait_for(&client, &base, &id, "proposal_ready").await;
        assert_eq!(snapshot["proposal"]["summary"], "fast second");
        assert_eq!(snapshot["draft"]["notes"], "fast second");

        tokio::time::sleep(Duration::from_millis(400)).await;
        let (_, snapshot) = get(&client, format!("{base}/api/wizards/{id}")).await;
        assert_eq!(snapshot["step"], "proposal_ready");
        assert_eq!(snapshot["proposal"]["summary"], "fast second");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn restart_while_generating_discards_result() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let id = wizard_at_input(&client, &base).await;

        post(
            &client,
            format!("{base}/api/wizards/{id}/submit"),
            json!({"mode": "freeform", "notes": "slow and abandoned"}),
        )
        .await;
        let (_, snapshot) = post(&client, format!("{base}/api/wizards/{id}/restart"), json!({})).await;
        assert_eq!(snapshot["step"], "select_industry");

        tokio::time::sleep(Duration::from_millis(400)).await;
        let (_, snapshot) = get(&client, format!("{base}/api/wizards/{id}")).await;
        assert_eq!(snapshot["step"], "select_industry");
        assert!(snapshot["proposal"].is_null());
        assert!(snapshot["error"].is_null());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn sessions_do_not_share_state() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server().await;
        let client = reqwest::Client::new();
        let a = wizard_at_input(&client, &base).await;
        let (_, b) = post(&client, format!("{base}/api/wizards"), json!({})).await;
        let b = b["id"].as_str().unwrap().to_string();

        post(
            &client,
            format!("{base}/api/wizards/{a}/submit"),
            json!({"mode": "freeform", "notes": "only for a"}),
        )
        .await;
        wait_for(&client, &base, &a, "proposal_ready").await;

        let (status, snapshot) = get(&client, format!("{base}/api/wizards/{b}")).await;
        assert_eq!(status, 200);
        assert_eq!(snapshot["step"], "select_industry");
        assert!(snapshot["proposal"].is_null());
    })
    .await
    .expect("test timed out");
}
