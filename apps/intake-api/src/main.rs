//! Intake API - Entry Point
//!
//! HTTP front door for job admission, status and result retrieval
//! (spec.md §6). Grounded on `apps/zerg/tasks-worker/src/lib.rs`'s
//! connect/shutdown shape, adapted to serve the primary app port instead
//! of only a health port, and on `apps/zerg/api/src/main.rs`'s metrics
//! wiring (minus the gRPC/JWT surface this service doesn't need).

mod auth;
mod config;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use core_config::tracing::init_tracing;
use domain_jobs::{handlers, JobService, PgJobRepository};
use stream_worker::StreamProducer;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;

use config::Config;

#[derive(OpenApi)]
#[openapi(
    nest((path = "", api = handlers::JobsApiDoc)),
    info(title = "Job Intake API", version = "0.1.0", description = "Job admission, status and result retrieval")
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.environment);
    observability::init_metrics();
    info!("Prometheus metrics initialized");

    info!("Connecting to PostgreSQL and Redis...");
    let postgres_future = async {
        database::postgres::connect_from_config_with_retry(config.database.clone(), None)
            .await
            .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))
    };
    let redis_future = async {
        database::redis::connect_from_config_with_retry(config.redis.clone(), None)
            .await
            .map_err(|e| eyre::eyre!("Redis connection failed: {}", e))
    };
    let (db, redis) = tokio::try_join!(postgres_future, redis_future)?;
    info!("Connected to PostgreSQL and Redis successfully");

    let repository = PgJobRepository::new(db.clone());
    let hi = StreamProducer::new(redis.clone(), domain_jobs::streams::stream_hi_name());
    let lo = StreamProducer::new(redis.clone(), domain_jobs::streams::stream_lo_name());
    let service = JobService::new(repository, hi, lo, config.cache_ttl_seconds);

    let jobs_router = handlers::router(service);

    let metrics_router = Router::new().route("/metrics", get(observability::metrics_handler));
    let ready_router = Router::new().route(
        "/ready",
        get({
            let db = db.clone();
            let redis = redis.clone();
            move || ready_handler(db.clone(), redis.clone())
        }),
    );

    let api_key: Arc<str> = Arc::from(config.api_key.as_str());
    let app = jobs_router
        .merge(ready_router)
        .merge(metrics_router)
        .layer(middleware::from_fn_with_state(api_key, auth::require_api_key))
        .layer(middleware::from_fn(observability::middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.server.address();
    let listener = TcpListener::bind(&addr).await?;
    info!(address = %addr, "Intake API listening");

    let shutdown = shutdown_signal();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Shutting down: closing database connections");
            tokio::time::sleep(Duration::from_millis(50)).await;
        })
        .await?;

    info!("Intake API shutdown complete");
    Ok(())
}

async fn ready_handler(
    db: database::postgres::DatabaseConnection,
    mut redis: database::redis::ConnectionManager,
) -> axum::Json<serde_json::Value> {
    let db_ok = db.ping().await.is_ok();
    let redis_ok = redis::cmd("PING")
        .query_async::<String>(&mut redis)
        .await
        .is_ok();

    axum::Json(serde_json::json!({
        "ready": db_ok && redis_ok,
        "database": db_ok,
        "redis": redis_ok,
    }))
}

async fn shutdown_signal() {
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
}
