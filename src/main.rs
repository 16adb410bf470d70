use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use triage_core::config::{
    optional_path_from_env_value, submissions_dir_from_env_value, sweep_interval_from_env_value,
};
use triage_core::constants::{
    SLA_TABLE_ENV, STATUS_REGISTRY_ENV, SUBMISSIONS_DIR_ENV, SWEEP_INTERVAL_ENV,
};
use triage_core::{
    CancellationToken, CoreConfig, ErrorDisposition, JsonDirStore, SubmissionStore,
    TriageEngine, sweep_store,
};

/// Main entry point for the triage engine
///
/// Runs the REST server and the periodic breach sweep concurrently:
/// - REST server on port 3000 (configurable via TRIAGE_REST_ADDR)
/// - Sweep over the JSON submission store every TRIAGE_SWEEP_INTERVAL_SECS seconds
///
/// Ctrl-C cancels the in-flight sweep and stops both.
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `TRIAGE_SUBMISSIONS_DIR`: Directory of submission JSON files (default: "submissions")
/// - `TRIAGE_SWEEP_INTERVAL_SECS`: Sweep cadence in seconds (default: 60)
/// - `TRIAGE_SLA_TABLE`: Optional SLA threshold table YAML
/// - `TRIAGE_STATUS_REGISTRY`: Optional status label overlay YAML
///
/// # Returns
/// * `Ok(())` - If the servers ran and shut down cleanly
/// * `Err(anyhow::Error)` - If configuration, startup or a sweep abort fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage=info".parse()?)
                .add_directive("triage_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("TRIAGE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

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

    let engine = TriageEngine::from_config(&cfg)?;
    let store: Arc<dyn SubmissionStore> = Arc::new(JsonDirStore::new(cfg.submissions_dir()));
    let token = CancellationToken::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tracing::info!("++ Starting triage REST on {}", rest_addr);
    tracing::info!(
        "++ Sweeping {} every {}s",
        cfg.submissions_dir().display(),
        cfg.sweep_interval().as_secs()
    );

    let rest_app = router(AppState {
        engine: engine.clone(),
        store: store.clone(),
    });
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    let rest_shutdown = shutdown_rx.clone();
    let rest_server = tokio::spawn(async move {
        axum::serve(listener, rest_app)
            .with_graceful_shutdown(wait_for_shutdown(rest_shutdown))
            .await
    });

    let mut sweeper = tokio::spawn(sweep_loop(
        engine,
        store,
        cfg.sweep_interval(),
        token.clone(),
        shutdown_rx,
    ));

    let sweep_result = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("-- Shutting down");
            trigger_shutdown(&token, &shutdown_tx);
            sweeper.await
        }
        finished = &mut sweeper => finished,
    };
    trigger_shutdown(&token, &shutdown_tx);

    rest_server.await??;
    sweep_result??;

    Ok(())
}

/// Runs one sweep per tick until `token` is cancelled.
///
/// Sweeps are CPU-bound and run on the blocking pool. Only errors with
/// [`ErrorDisposition::AbortSweep`] stop the loop; anything else is logged and retried on the
/// next tick.
async fn sweep_loop(
    engine: TriageEngine,
    store: Arc<dyn SubmissionStore>,
    interval: std::time::Duration,
    token: CancellationToken,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    while !token.is_cancelled() {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = wait_for_shutdown(shutdown.clone()) => break,
        }

        let (engine, store, sweep_token) = (engine.clone(), store.clone(), token.clone());
        let now = chrono::Utc::now();
        let result = tokio::task::spawn_blocking(move || {
            sweep_store(&engine, store.as_ref(), now, &sweep_token)
        })
        .await?;

        match result {
            Ok(report) => {
                for decision in report.escalations() {
                    tracing::warn!(
                        sweep_id = %report.sweep_id,
                        submission_id = %decision.submission_id,
                        urgency = %decision.urgency_level,
                        escalate_to = ?decision.escalation.escalate_to,
                        "{}",
                        decision.compliance.message
                    );
                }
                if report.cancelled() {
                    tracing::info!(
                        not_evaluated = report.not_evaluated,
                        "sweep cancelled before completion"
                    );
                }
            }
            Err(e) if e.disposition() == ErrorDisposition::AbortSweep => {
                tracing::error!(kind = e.kind(), "sweep aborted: {e}");
                return Err(e.into());
            }
            Err(e) => tracing::warn!(kind = e.kind(), "sweep skipped: {e}"),
        }
    }

    Ok(())
}

/// Stops the in-flight sweep and wakes every [`wait_for_shutdown`] caller.
fn trigger_shutdown(token: &CancellationToken, shutdown: &watch::Sender<bool>) {
    token.cancel();
    shutdown.send_replace(true);
}

/// Resolves once shutdown has been triggered or the sender is gone.
async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stopped| *stopped).await;
}
