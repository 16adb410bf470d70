//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without the periodic sweep.
//!
//! ## Intended use
//! Useful for development and debugging when you only want the REST server (with
//! OpenAPI/Swagger UI). The workspace's main `triage-run` binary runs the REST server and the
//! background sweep together.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use triage_core::config::{
    optional_path_from_env_value, submissions_dir_from_env_value, sweep_interval_from_env_value,
};
use triage_core::constants::{
    SLA_TABLE_ENV, STATUS_REGISTRY_ENV, SUBMISSIONS_DIR_ENV, SWEEP_INTERVAL_ENV,
};
use triage_core::{CoreConfig, JsonDirStore, TriageEngine};

/// Main entry point for the triage REST API server.
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `TRIAGE_SLA_TABLE`, `TRIAGE_STATUS_REGISTRY`: optional YAML configuration files
/// - `TRIAGE_SUBMISSIONS_DIR`: JSON submission store directory (default: "submissions")
///
/// # Errors
/// Returns an error if configuration cannot be loaded, the address cannot be bound, or the
/// HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("triage_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("TRIAGE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(
        optional_path_from_env_value(std::env::var(SLA_TABLE_ENV).ok()),
        optional_path_from_env_value(std::env::var(STATUS_REGISTRY_ENV).ok()),
        submissions_dir_from_env_value(std::env::var(SUBMISSIONS_DIR_ENV).ok()),
        sweep_interval_from_env_value(std::env::var(SWEEP_INTERVAL_ENV).ok())?,
    )?;
    if !cfg.submissions_dir().is_dir() {
        anyhow::bail!(
            "Submissions directory does not exist: {}",
            cfg.submissions_dir().display()
        );
    }

    let state = AppState {
        engine: TriageEngine::from_config(&cfg)?,
        store: Arc::new(JsonDirStore::new(cfg.submissions_dir())),
    };

    tracing::info!("-- Starting triage REST API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
