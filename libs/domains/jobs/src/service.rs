use std::sync::Arc;

use stream_worker::StreamProducer;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::dedup::dedup_key;
use crate::error::JobsError;
use crate::models::{CacheLookupResponse, EnqueueRequest, EnqueueResponse, Job, JobResponse, JobSource, JobStatus};
use crate::repository::{JobRepository, NewJob};
use crate::stream_models::JobMessage;

/// Priority 9 is reserved for user-interactive escalation (§9 design notes,
/// OQ3): the admission algorithm floors the row's priority at this value
/// for a `user_click` enqueue rather than treating it as a ceiling.
pub const ESCALATION_PRIORITY: i16 = 9;

/// Service layer implementing the admission algorithm of spec.md §4.1.
#[derive(Clone)]
pub struct JobService<R: JobRepository> {
    repository: Arc<R>,
    hi: StreamProducer,
    lo: StreamProducer,
    cache_ttl_seconds: i64,
}

impl<R: JobRepository> JobService<R> {
    pub fn new(repository: R, hi: StreamProducer, lo: StreamProducer, cache_ttl_seconds: i64) -> Self {
        Self {
            repository: Arc::new(repository),
            hi,
            lo,
            cache_ttl_seconds,
        }
    }

    /// `Enqueue(req) → { job_id, status, dedup, message }` (spec.md §4.1).
    #[instrument(skip(self, req), fields(nup = %req.nup))]
    pub async fn enqueue(&self, req: EnqueueRequest) -> Result<EnqueueResponse, JobsError> {
        req.validate()
            .map_err(|e| JobsError::Validation(e.to_string()))?;

        let key = dedup_key(&req.nup, req.scope.as_deref(), &req.mode);

        // Step 2: cache hit on a recent `done` job, unless the caller forces a fresh run.
        if !req.force {
            if let Some(done) = self
                .repository
                .find_done_dedup(&key, self.cache_ttl_seconds)
                .await?
            {
                return Ok(EnqueueResponse {
                    job_id: done.job_id,
                    status: JobStatus::Done,
                    dedup: true,
                    message: "cache hit".to_string(),
                });
            }
        }

        // Step 3: an active job with the same fingerprint is already in flight.
        if !req.force {
            if let Some(active) = self.repository.find_active_dedup(&key).await? {
                if req.source == JobSource::UserClick {
                    self.repository
                        .bump_priority(active.job_id, ESCALATION_PRIORITY.max(req.priority))
                        .await?;
                    self.hi
                        .send(&JobMessage::new(active.job_id, ESCALATION_PRIORITY))
                        .await?;
                    tracing::info!(job_id = %active.job_id, "escalated in-flight job to hi stream");
                }

                return Ok(EnqueueResponse {
                    job_id: active.job_id,
                    status: JobStatus::Queued,
                    dedup: true,
                    message: format!("already {}", active.status),
                });
            }
        }

        // Steps 4-5: no cache hit, no active duplicate (or forced) — insert and enqueue.
        let job_id = self
            .repository
            .insert(NewJob {
                nup: req.nup.clone(),
                scope: req.scope.clone(),
                requester: req.requester(),
                mode: req.mode.clone(),
                priority: req.priority,
                max_attempts: req.max_attempts,
                dedup_key: key,
            })
            .await?;

        let message = JobMessage::new(job_id, req.priority);
        match req.source {
            JobSource::UserClick => self.hi.send(&message).await?,
            JobSource::Monitor => self.lo.send(&message).await?,
        };

        Ok(EnqueueResponse {
            job_id,
            status: JobStatus::Queued,
            dedup: false,
            message: "queued".to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn get_job(&self, job_id: Uuid) -> Result<JobResponse, JobsError> {
        let job = self.get_row(job_id).await?;
        Ok(job.into())
    }

    /// `GetResult(job_id) → compact result_json` (404 unless `done`).
    #[instrument(skip(self))]
    pub async fn get_result(&self, job_id: Uuid) -> Result<serde_json::Value, JobsError> {
        let job = self.get_row(job_id).await?;
        if job.status != JobStatus::Done {
            return Err(JobsError::NotFound(format!("job {job_id} is not done")));
        }
        job.result_json
            .ok_or_else(|| JobsError::Internal(format!("job {job_id} is done but has no result_json")))
    }

    /// `GetResultFull(job_id) → contents of result_path` (404 unless `done` and file exists).
    #[instrument(skip(self))]
    pub async fn get_result_path(&self, job_id: Uuid) -> Result<String, JobsError> {
        let job = self.get_row(job_id).await?;
        if job.status != JobStatus::Done {
            return Err(JobsError::NotFound(format!("job {job_id} is not done")));
        }
        job.result_path
            .ok_or_else(|| JobsError::NotFound(format!("job {job_id} has no result file")))
    }

    /// `CacheLookup(nup, scope) → { hit, job_id?, finished_at? }`.
    #[instrument(skip(self))]
    pub async fn cache_lookup(&self, nup: &str, scope: Option<&str>) -> Result<CacheLookupResponse, JobsError> {
        let job = self
            .repository
            .latest_by_nup(nup, scope, Some(self.cache_ttl_seconds))
            .await?;

        Ok(match job {
            Some(job) => CacheLookupResponse {
                hit: true,
                job_id: Some(job.job_id),
                finished_at: job.finished_at,
            },
            None => CacheLookupResponse {
                hit: false,
                job_id: None,
                finished_at: None,
            },
        })
    }

    async fn get_row(&self, job_id: Uuid) -> Result<Job, JobsError> {
        self.repository
            .get_by_id(job_id)
            .await?
            .ok_or_else(|| JobsError::NotFound(format!("job {job_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // `JobService` owns two live `StreamProducer`s, each built from a
    // connected `redis::aio::ConnectionManager`; admission-algorithm
    // coverage (cache hit, active dedup, user-click escalation, fresh
    // insert) lives in the crate's `tests/` integration suite, against a
    // real Postgres + Redis via testcontainers, the way
    // `libs/testing/test-utils` exercises the rest of this workspace.

    #[test]
    fn escalation_priority_is_reserved_for_user_click() {
        assert_eq!(ESCALATION_PRIORITY, 9);
    }
}
