use std::sync::Arc;

use anyhow::Context;
use proposal_wizard::catalog::DiscoveryCatalog;
use proposal_wizard::config::{AppConfig, BrandConfig, GatewayConfig};
use proposal_wizard::gateway::{GeminiGateway, ProposalGateway};
use proposal_wizard::wizard::{WizardRegistry, wizard_routes};
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let app_config = AppConfig::from_env()?;
    let gateway_config = GatewayConfig::from_env()
        .context("GEMINI_API_KEY must be set (export GEMINI_API_KEY=...)")?;
    let brand = BrandConfig::from_env();

    let catalog = match &app_config.catalog_path {
        Some(path) => DiscoveryCatalog::load(path)?,
        None => DiscoveryCatalog::builtin()?,
    };

    eprintln!("📝 Proposal Wizard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", gateway_config.model);
    eprintln!("   API: http://0.0.0.0:{}/api/wizards", app_config.port);

    let gateway: Arc<dyn ProposalGateway> =
        Arc::new(GeminiGateway::new(gateway_config, brand.clone())?);
    let registry = WizardRegistry::new(gateway, Arc::new(catalog), app_config.generation_timeout);
    registry.spawn_sweeper(app_config.session_ttl, app_config.session_sweep_interval);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = wizard_routes(registry, brand).layer(cors);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", app_config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", app_config.port))?;
    tracing::info!(port = app_config.port, "Proposal wizard server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
