//! Job worker service: claims jobs from the `jobs:hi`/`jobs:lo` streams and
//! runs them through `JobProcessor`'s six-stage pipeline.
//!
//! Grounded wholesale on `apps/zerg/tasks-worker/src/lib.rs`'s `run()`
//! shape. `stream-worker`'s `StreamWorker` reads exactly one stream per
//! instance, so the two-priority queue of spec.md §5 is served by two
//! workers sharing one cloned `JobProcessor`, with `jobs:hi` given a much
//! shorter block timeout so it is polled far more often than `jobs:lo`
//! (§9 OQ — no built-in notion of "drain hi before lo" in a blocking
//! `XREADGROUP` loop, so relative poll frequency is the idiomatic stand-in).

use std::sync::Arc;

use axum::Router;
use core_config::{app_info, Environment, FromEnv};
use database::{
    postgres::{connect_from_config_with_retry, PostgresConfig},
    redis::RedisConfig,
};
use domain_jobs::pipeline::{Analyst, Curator, Extractor, NoopAnalyst, NoopCurator};
use domain_jobs::processor::JobProcessor;
use domain_jobs::streams::{consumer_group_name, consumer_name, stream_hi_name, stream_lo_name};
use domain_jobs::PgJobRepository;
use eyre::{Result, WrapErr};
use stream_worker::{full_admin_router, metrics, HealthState, StreamWorker, WorkerConfig};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

async fn start_health_server(health_state: HealthState, port: u16) -> Result<()> {
    let app: Router = full_admin_router(health_state);
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind health server to {addr}"))?;
    info!(port = %port, "Health and admin server listening");
    axum::serve(listener, app).await.wrap_err("Health server failed")?;
    Ok(())
}

/// No capability is wired for `Extractor`: it is deliberately opaque
/// (spec.md §1) with no in-repo default — production wiring supplies one
/// that talks to the document viewer this service sits in front of.
pub async fn run(extractor: Arc<dyn Extractor>) -> Result<()> {
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);
    metrics::init_metrics();

    let app_info = app_info!();
    info!(name = %app_info.name, version = %app_info.version, "Starting job worker service");
    info!("Environment: {:?}", environment);

    let health_port: u16 = std::env::var("JOB_WORKER_HEALTH_PORT")
        .or_else(|_| std::env::var("HEALTH_PORT"))
        .unwrap_or_else(|_| "8082".to_string())
        .parse()
        .unwrap_or(8082);

    let pg_config = PostgresConfig::from_env().wrap_err("Failed to load PostgreSQL configuration")?;
    info!("Connecting to PostgreSQL...");
    let db = connect_from_config_with_retry(pg_config, None)
        .await
        .wrap_err("Failed to connect to PostgreSQL")?;
    info!("Connected to PostgreSQL successfully");

    let redis_config = RedisConfig::from_env().wrap_err("Failed to load Redis configuration")?;
    info!("Connecting to Redis...");
    let redis = database::redis::connect_from_config_with_retry(redis_config, None)
        .await
        .wrap_err("Failed to connect to Redis")?;
    info!("Connected to Redis successfully");

    let lock_minutes: i64 = std::env::var("LOCK_MINUTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(25);
    let locked_by = app_info.name.clone();

    let use_llm = std::env::var("USE_LLM")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(true);
    let (curator, analyst) = build_capabilities(use_llm);

    let artifacts_root = std::env::var("ARTIFACTS_ROOT").unwrap_or_else(|_| "/data/detalhar".to_string());
    let credentials = domain_jobs::pipeline::Credentials {
        username: std::env::var("VIEWER_USERNAME").unwrap_or_default(),
        secret: std::env::var("VIEWER_SECRET").unwrap_or_default(),
    };

    let repository = Arc::new(PgJobRepository::new(db));
    let processor = JobProcessor::new(
        repository,
        domain_jobs::artifacts::ArtifactStore::new(artifacts_root),
        extractor,
        curator,
        analyst,
        credentials,
        locked_by,
        lock_minutes,
    );

    let group = consumer_group_name();
    let hi_stream = stream_hi_name();
    let lo_stream = stream_lo_name();

    let mut hi_config = WorkerConfig::new(hi_stream.clone(), group.clone())
        .with_dlq_stream(format!("{hi_stream}:dlq"))
        .with_max_length(100_000)
        .with_blocking(Some(200))
        .with_batch_size(20)
        .with_max_concurrent_jobs(10);
    let mut lo_config = WorkerConfig::new(lo_stream.clone(), group)
        .with_dlq_stream(format!("{lo_stream}:dlq"))
        .with_max_length(100_000)
        .with_blocking(Some(2000))
        .with_batch_size(20)
        .with_max_concurrent_jobs(5);
    if let Some(name) = consumer_name() {
        hi_config = hi_config.with_consumer_id(format!("{name}-hi"));
        lo_config = lo_config.with_consumer_id(format!("{name}-lo"));
    }

    info!(
        hi_stream = %hi_config.stream_name,
        lo_stream = %lo_config.stream_name,
        "Worker configuration loaded"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            error!("Error waiting for shutdown signal: {}", e);
        }
        let _ = shutdown_tx.send(true);
    });

    let health_state = HealthState::new(
        Arc::new(redis.clone()),
        app_info.name,
        app_info.version,
        hi_config.stream_name.clone(),
    );
    let health_state_clone = health_state.clone();
    tokio::spawn(async move {
        if let Err(e) = start_health_server(health_state_clone, health_port).await {
            error!(error = %e, "Health server failed");
        }
    });

    info!("Starting job processors...");
    let hi_worker = StreamWorker::new(redis.clone(), processor.clone(), hi_config);
    let lo_worker = StreamWorker::new(redis, processor, lo_config);

    let hi_shutdown = shutdown_rx.clone();
    let lo_shutdown = shutdown_rx;

    tokio::try_join!(
        async { hi_worker.run(hi_shutdown).await.map_err(|e| eyre::eyre!("{e}")) },
        async { lo_worker.run(lo_shutdown).await.map_err(|e| eyre::eyre!("{e}")) },
    )?;

    info!("Job worker service stopped");
    Ok(())
}

fn build_capabilities(use_llm: bool) -> (Arc<dyn Curator>, Arc<dyn Analyst>) {
    if !use_llm {
        info!("USE_LLM=false, running curation/analysis without an LLM");
        return (Arc::new(NoopCurator), Arc::new(NoopAnalyst));
    }

    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        tracing::warn!("USE_LLM=true but OPENAI_API_KEY is unset, falling back to no-op capabilities");
        return (Arc::new(NoopCurator), Arc::new(NoopAnalyst));
    }

    let http = reqwest::Client::new();
    // curador_llm.py: gpt-4o-mini-class pricing, $0.15/$0.60 per M tokens.
    let curator_client = domain_jobs::llm::OpenAiClient::new(http.clone(), api_key.clone(), "gpt-4o-mini", 0.15, 0.60);
    // analista_llm.py: gpt-4.1-mini-class pricing, $0.4/$1.6 per M tokens.
    let analyst_client = domain_jobs::llm::OpenAiClient::new(http, api_key, "gpt-4.1-mini", 0.4, 1.6);

    (
        Arc::new(domain_jobs::llm::OpenAiCurator::new(curator_client)),
        Arc::new(domain_jobs::llm::OpenAiAnalyst::new(analyst_client)),
    )
}

async fn shutdown_signal() -> Result<()> {
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
