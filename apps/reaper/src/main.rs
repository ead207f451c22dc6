//! Reaper - Entry Point
//!
//! Standalone process that reclaims jobs whose processing lease expired
//! without the worker finishing them (spec.md §7), grounded on
//! `SQL_REQUEUE_STALE` in the original's `models.py` and on
//! `StreamWorker::run`'s own `tokio::select!`-driven interval loop for the
//! shutdown-aware sleep pattern.

use std::time::Duration;

use axum::{routing::get, Router};
use core_config::{app_info, tracing::init_tracing, Environment, FromEnv};
use database::postgres::{connect_from_config_with_retry as connect_postgres, PostgresConfig};
use database::redis::{connect_from_config_with_retry as connect_redis, RedisConfig};
use domain_jobs::{JobMessage, JobRepository, PgJobRepository};
use stream_worker::StreamProducer;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

async fn start_metrics_server(port: u16) -> eyre::Result<()> {
    let app = Router::new().route("/metrics", get(observability::metrics_handler));
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(port = %port, "Metrics server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let environment = Environment::from_env();
    init_tracing(&environment);
    observability::init_metrics();

    let app_info = app_info!();
    info!(name = %app_info.name, version = %app_info.version, "Starting reaper");

    let metrics_port: u16 = std::env::var("METRICS_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(9090);
    tokio::spawn(async move {
        if let Err(e) = start_metrics_server(metrics_port).await {
            error!(error = %e, "Metrics server failed");
        }
    });

    let pg_config = PostgresConfig::from_env()?;
    let db = connect_postgres(pg_config, None).await?;
    let repository = PgJobRepository::new(db);

    let redis_config = RedisConfig::from_env()?;
    let redis = connect_redis(redis_config, None).await?;
    let lo = StreamProducer::new(redis, domain_jobs::streams::stream_lo_name());

    let interval_secs: u64 = std::env::var("REAPER_INTERVAL_SECONDS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);
    let interval = Duration::from_secs(interval_secs);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            error!("Error waiting for shutdown signal: {}", e);
        }
        let _ = shutdown_tx.send(true);
    });

    info!(interval_secs = %interval_secs, "Reaper sweep loop starting");
    loop {
        if *shutdown_rx.borrow() {
            info!("Received shutdown signal, stopping reaper");
            break;
        }

        match repository.requeue_stale().await {
            Ok(reclaimed) if reclaimed.is_empty() => {}
            Ok(reclaimed) => {
                info!(count = reclaimed.len(), "Reclaimed stale job leases");
                // spec.md §7: reclaimed jobs always re-enter the low stream,
                // regardless of priority, so an abandoned hi-priority job
                // doesn't repeatedly jump the hi queue on every stale sweep.
                for (job_id, priority) in reclaimed {
                    if let Err(e) = lo.send(&JobMessage::new(job_id, priority)).await {
                        error!(job_id = %job_id, error = %e, "Failed to re-queue reclaimed job on stream");
                    }
                }
            }
            Err(e) => warn!(error = %e, "Failed to sweep stale job leases"),
        }

        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    info!("Received shutdown signal, stopping reaper");
                    break;
                }
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!("Reaper shutdown complete");
    Ok(())
}

async fn shutdown_signal() -> eyre::Result<()> {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { info!("Received Ctrl+C, initiating shutdown..."); },
        _ = terminate => { info!("Received SIGTERM, initiating shutdown..."); },
    }

    Ok(())
}
