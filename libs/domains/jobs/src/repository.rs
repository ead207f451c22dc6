use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::JobsError;
use crate::models::Job;

/// Outcome of a dedup lookup against an active (queued/running/retry) job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDedupMatch {
    pub job_id: Uuid,
    pub status: String,
}

/// Outcome of a dedup lookup against a recently completed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoneDedupMatch {
    pub job_id: Uuid,
    pub finished_at: DateTime<Utc>,
}

/// Fields required to insert a new row (spec.md §4.1 step 5).
#[derive(Debug, Clone)]
pub struct NewJob {
    pub nup: String,
    pub scope: Option<String>,
    pub requester: Option<String>,
    pub mode: String,
    pub priority: i16,
    pub max_attempts: i32,
    pub dedup_key: String,
}

/// A job claimed for processing by `SQL_CLAIM_JOB`: just enough to run the
/// pipeline, the full row is fetched separately if needed.
#[derive(Debug, Clone)]
pub struct ClaimedJob {
    pub job_id: Uuid,
    pub nup: String,
    pub scope: Option<String>,
    pub requester: Option<String>,
    pub attempts: i32,
    pub max_attempts: i32,
}

/// Data access for the `jobs` table (spec.md §4.1/§4.3).
///
/// Every method here maps to a single statement; the locking/retry
/// protocol lives in the queries themselves (`WHERE status IN (...)`,
/// `locked_until < NOW()`), not in application code, so concurrent workers
/// never need an explicit transaction to claim a row safely.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// `SQL_FIND_DEDUP_ACTIVE`: most recent queued/running/retry job sharing
    /// this dedup key, if any.
    async fn find_active_dedup(&self, dedup_key: &str) -> Result<Option<ActiveDedupMatch>, JobsError>;

    /// `SQL_FIND_DEDUP_DONE_TTL`: most recent `done` job sharing this dedup
    /// key finished within `ttl_seconds`, if any.
    async fn find_done_dedup(
        &self,
        dedup_key: &str,
        ttl_seconds: i64,
    ) -> Result<Option<DoneDedupMatch>, JobsError>;

    /// `SQL_INSERT_JOB`.
    async fn insert(&self, job: NewJob) -> Result<Uuid, JobsError>;

    /// `SQL_BUMP_PRIORITY`: raise `priority` to `GREATEST(priority, priority)`.
    async fn bump_priority(&self, job_id: Uuid, priority: i16) -> Result<(), JobsError>;

    /// `SQL_GET_JOB`: the full row projection.
    async fn get_by_id(&self, job_id: Uuid) -> Result<Option<Job>, JobsError>;

    /// `SQL_LATEST_BY_NUP` / `SQL_LATEST_DONE_BY_NUP_TTL` depending on `done_only`.
    async fn latest_by_nup(
        &self,
        nup: &str,
        scope: Option<&str>,
        done_only_ttl_seconds: Option<i64>,
    ) -> Result<Option<Job>, JobsError>;

    /// `SQL_CLAIM_JOB`: atomically move one eligible row to `running`.
    async fn claim_one(&self, locked_by: &str, lock_minutes: i64) -> Result<Option<ClaimedJob>, JobsError>;

    /// `SQL_CLAIM_JOB` scoped to a specific row, used by the worker once it
    /// has popped a job id off the stream.
    async fn claim(
        &self,
        job_id: Uuid,
        locked_by: &str,
        lock_minutes: i64,
    ) -> Result<Option<ClaimedJob>, JobsError>;

    /// Persist pipeline progress without finishing the job: `status_stage`
    /// advances and the stage's artifact path column is recorded, row stays
    /// `running`.
    async fn advance_stage(
        &self,
        job_id: Uuid,
        stage: crate::models::JobStage,
        artifact_path: &str,
    ) -> Result<(), JobsError>;

    /// `SQL_FINISH_DONE`.
    async fn finish_done(
        &self,
        job_id: Uuid,
        result_json: serde_json::Value,
        result_path: Option<&str>,
    ) -> Result<(), JobsError>;

    /// `SQL_FINISH_RETRY`.
    async fn finish_retry(&self, job_id: Uuid, error: &str, delay_seconds: i64) -> Result<(), JobsError>;

    /// `SQL_FINISH_ERROR`.
    async fn finish_error(&self, job_id: Uuid, error: &str) -> Result<(), JobsError>;

    /// `SQL_REQUEUE_STALE`: reclaim every row whose lease has expired.
    /// Returns the id and current priority of each row requeued, so the
    /// caller can re-push a message on the stream matching that priority.
    async fn requeue_stale(&self) -> Result<Vec<(Uuid, i16)>, JobsError>;
}
