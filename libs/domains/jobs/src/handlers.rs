//! HTTP surface for the jobs domain (spec.md §6), grounded in
//! `libs/domains/tasks/src/handlers/direct.rs`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};
use uuid::Uuid;

use crate::error::JobsError;
use crate::models::{CacheLookupResponse, EnqueueRequest, EnqueueResponse, JobResponse};
use crate::repository::JobRepository;
use crate::service::JobService;

type JobsResult<T> = Result<T, JobsError>;

#[derive(Debug, Deserialize, IntoParams)]
pub struct CacheQuery {
    pub scope: Option<String>,
}

/// `POST /enqueue` (spec.md §4.1).
#[utoipa::path(
    post,
    path = "/enqueue",
    tag = "jobs",
    request_body = EnqueueRequest,
    responses(
        (status = 200, description = "Job admitted or deduplicated", body = EnqueueResponse),
        (status = 400, description = "Invalid request"),
    )
)]
pub async fn enqueue<R: JobRepository>(
    State(service): State<Arc<JobService<R>>>,
    Json(req): Json<EnqueueRequest>,
) -> JobsResult<Json<EnqueueResponse>> {
    let response = service.enqueue(req).await?;
    Ok(Json(response))
}

/// `GET /jobs/{job_id}`.
#[utoipa::path(
    get,
    path = "/jobs/{job_id}",
    tag = "jobs",
    params(("job_id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job row", body = JobResponse),
        (status = 404, description = "Job not found"),
    )
)]
pub async fn get_job<R: JobRepository>(
    State(service): State<Arc<JobService<R>>>,
    Path(job_id): Path<Uuid>,
) -> JobsResult<Json<JobResponse>> {
    let job = service.get_job(job_id).await?;
    Ok(Json(job))
}

/// `GET /jobs/{job_id}/result`: the compact `result_json` column.
#[utoipa::path(
    get,
    path = "/jobs/{job_id}/result",
    tag = "jobs",
    params(("job_id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Compact result", body = serde_json::Value),
        (status = 404, description = "Job not done"),
    )
)]
pub async fn get_result<R: JobRepository>(
    State(service): State<Arc<JobService<R>>>,
    Path(job_id): Path<Uuid>,
) -> JobsResult<Json<serde_json::Value>> {
    let result = service.get_result(job_id).await?;
    Ok(Json(result))
}

/// `GET /jobs/{job_id}/result/full`: streams the `resumo/{job_id}.json`
/// artifact from disk rather than the condensed `result_json` column.
#[utoipa::path(
    get,
    path = "/jobs/{job_id}/result/full",
    tag = "jobs",
    params(("job_id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Full artifact contents"),
        (status = 404, description = "Job not done or artifact missing"),
    )
)]
pub async fn get_result_full<R: JobRepository>(
    State(service): State<Arc<JobService<R>>>,
    Path(job_id): Path<Uuid>,
) -> JobsResult<impl IntoResponse> {
    let path = service.get_result_path(job_id).await?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| JobsError::NotFound(format!("result artifact for job {job_id} unreadable: {e}")))?;
    Ok(([(header::CONTENT_TYPE, "application/json")], bytes))
}

/// `GET /nup/{nup}/cache` (spec.md §4.1).
#[utoipa::path(
    get,
    path = "/nup/{nup}/cache",
    tag = "jobs",
    params(
        ("nup" = String, Path, description = "Process identifier"),
        CacheQuery,
    ),
    responses((status = 200, description = "Cache lookup outcome", body = CacheLookupResponse))
)]
pub async fn cache_lookup<R: JobRepository>(
    State(service): State<Arc<JobService<R>>>,
    Path(nup): Path<String>,
    Query(query): Query<CacheQuery>,
) -> JobsResult<Json<CacheLookupResponse>> {
    let response = service.cache_lookup(&nup, query.scope.as_deref()).await?;
    Ok(Json(response))
}

/// `GET /health`: liveness only, no external dependency checks (those live
/// at `/ready` in `apps/intake-api`).
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "ok": true })))
}

#[derive(OpenApi)]
#[openapi(
    paths(enqueue, get_job, get_result, get_result_full, cache_lookup),
    components(schemas(EnqueueRequest, EnqueueResponse, JobResponse, CacheLookupResponse)),
    tags((name = "jobs", description = "Job intake, status and result retrieval"))
)]
pub struct JobsApiDoc;

/// Builds the router for the jobs domain, to be nested under the API's root.
pub fn router<R: JobRepository + 'static>(service: JobService<R>) -> Router {
    let shared = Arc::new(service);

    Router::new()
        .route("/enqueue", post(enqueue::<R>))
        .route("/jobs/{job_id}", get(get_job::<R>))
        .route("/jobs/{job_id}/result", get(get_result::<R>))
        .route("/jobs/{job_id}/result/full", get(get_result_full::<R>))
        .route("/nup/{nup}/cache", get(cache_lookup::<R>))
        .route("/health", get(health))
        .with_state(shared)
}
