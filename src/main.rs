use std::process::ExitCode;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;

use bmi_database::config::Settings;
use bmi_database::metrics::encode_metrics;
use bmi_database::postgres::{spawn_event_logger, DatabasePool};
use bmi_database::startup::{RetryPolicy, StartupProber};
use bmi_database::tasks::PoolMonitorTask;
use bmi_database::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing
    let _telemetry = match init_telemetry(&settings.otel, settings.log.format) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Fatal startup error, exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings) -> Result<()> {
    tracing::info!(run_mode = %settings.run_mode, "Configuration loaded");
    if settings.uses_development_database() {
        tracing::warn!("DATABASE_URL not set, using local development database");
    }

    let (pool, events) =
        DatabasePool::new(&settings.database).context("Failed to create database pool")?;
    let event_logger = spawn_event_logger(events);

    // A database that never comes up is fatal
    let prober = StartupProber::new(RetryPolicy::from(&settings.startup));
    let probe = prober
        .run(&pool)
        .await
        .context("Failed to establish database connection")?;
    tracing::info!(
        attempts = probe.attempts,
        server_time = %probe.server_time,
        url = %pool.database_url_masked(),
        "Database ready"
    );

    let (shutdown_tx, _) = broadcast::channel(1);
    let monitor = PoolMonitorTask::new(
        settings.monitor.clone(),
        pool.clone(),
        shutdown_tx.subscribe(),
    );
    let monitor_handle = tokio::spawn(monitor.run());

    shutdown_signal_handler(shutdown_tx).await;

    tracing::info!("Waiting for background tasks to finish...");
    if let Err(e) = monitor_handle.await {
        tracing::warn!(error = %e, "Pool monitor task ended abnormally");
    }

    pool.close().await;
    event_logger.abort();

    if let Ok(snapshot) = encode_metrics() {
        tracing::debug!(metrics = %snapshot, "Final metrics snapshot");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }

    let _ = shutdown_tx.send(());
}
