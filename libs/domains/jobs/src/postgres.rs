use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement};
use uuid::Uuid;

use crate::entity;
use crate::error::JobsError;
use crate::models::{Job, JobStage};
use crate::repository::{ActiveDedupMatch, ClaimedJob, DoneDedupMatch, JobRepository, NewJob};

/// Postgres-backed `JobRepository`.
///
/// The claim/finish/requeue operations run as single raw statements rather
/// than through `sea-orm`'s query builder: the locking protocol (§4.1/§4.3)
/// depends on the exact `WHERE` clause doubling as the compare-and-swap, and
/// spelling that out as a builder chain would obscure it.
pub struct PgJobRepository {
    db: DatabaseConnection,
}

impl PgJobRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct ActiveDedupRow {
    job_id: Uuid,
    status: String,
}

#[derive(Debug, FromQueryResult)]
struct DoneDedupRow {
    job_id: Uuid,
    finished_at: DateTime<Utc>,
}

#[derive(Debug, FromQueryResult)]
struct ClaimedJobRow {
    job_id: Uuid,
    nup: String,
    scope: Option<String>,
    requester: Option<String>,
    attempts: i32,
    max_attempts: i32,
}

impl From<ClaimedJobRow> for ClaimedJob {
    fn from(row: ClaimedJobRow) -> Self {
        Self {
            job_id: row.job_id,
            nup: row.nup,
            scope: row.scope,
            requester: row.requester,
            attempts: row.attempts,
            max_attempts: row.max_attempts,
        }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn find_active_dedup(&self, dedup_key: &str) -> Result<Option<ActiveDedupMatch>, JobsError> {
        let sql = r#"
            SELECT job_id, status::text AS status
            FROM jobs
            WHERE dedup_key = $1
              AND status IN ('queued', 'running', 'retry')
            ORDER BY created_at DESC
            LIMIT 1
        "#;
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [dedup_key.into()]);
        let row = ActiveDedupRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| ActiveDedupMatch {
            job_id: r.job_id,
            status: r.status,
        }))
    }

    async fn find_done_dedup(
        &self,
        dedup_key: &str,
        ttl_seconds: i64,
    ) -> Result<Option<DoneDedupMatch>, JobsError> {
        let sql = r#"
            SELECT job_id, finished_at
            FROM jobs
            WHERE dedup_key = $1
              AND status = 'done'
              AND finished_at >= (NOW() - ($2 * INTERVAL '1 second'))
            ORDER BY finished_at DESC
            LIMIT 1
        "#;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [dedup_key.into(), ttl_seconds.into()],
        );
        let row = DoneDedupRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(|r| DoneDedupMatch {
            job_id: r.job_id,
            finished_at: r.finished_at,
        }))
    }

    async fn insert(&self, job: NewJob) -> Result<Uuid, JobsError> {
        let sql = r#"
            INSERT INTO jobs (nup, scope, requester, mode, status, priority, max_attempts, dedup_key)
            VALUES ($1, $2, $3, $4, 'queued', $5, $6, $7)
            RETURNING job_id
        "#;
        #[derive(Debug, FromQueryResult)]
        struct InsertedRow {
            job_id: Uuid,
        }
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                job.nup.into(),
                job.scope.into(),
                job.requester.into(),
                job.mode.into(),
                job.priority.into(),
                job.max_attempts.into(),
                job.dedup_key.into(),
            ],
        );
        let row = InsertedRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .ok_or_else(|| JobsError::Internal("insert did not return a job_id".to_string()))?;
        Ok(row.job_id)
    }

    async fn bump_priority(&self, job_id: Uuid, priority: i16) -> Result<(), JobsError> {
        let sql = r#"
            UPDATE jobs
            SET priority = GREATEST(priority, $2),
                updated_at = NOW()
            WHERE job_id = $1
        "#;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [job_id.into(), priority.into()],
        );
        self.db.execute(stmt).await?;
        Ok(())
    }

    async fn get_by_id(&self, job_id: Uuid) -> Result<Option<Job>, JobsError> {
        use database::BaseRepository;
        let base = BaseRepository::<entity::Entity>::new(self.db.clone());
        let model = base.find_by_id(job_id).await?;
        Ok(model.map(Into::into))
    }

    async fn latest_by_nup(
        &self,
        nup: &str,
        scope: Option<&str>,
        done_only_ttl_seconds: Option<i64>,
    ) -> Result<Option<Job>, JobsError> {
        let row: Option<entity::Model> = if let Some(ttl) = done_only_ttl_seconds {
            let sql = r#"
                SELECT *
                FROM jobs
                WHERE nup = $1
                  AND (CAST($2 AS TEXT) IS NULL OR scope = $2)
                  AND status = 'done'
                  AND finished_at >= (NOW() - ($3 * INTERVAL '1 second'))
                ORDER BY finished_at DESC
                LIMIT 1
            "#;
            let stmt = Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                [nup.into(), scope.into(), ttl.into()],
            );
            entity::Model::find_by_statement(stmt).one(&self.db).await?
        } else {
            let sql = r#"
                SELECT *
                FROM jobs
                WHERE nup = $1
                  AND (CAST($2 AS TEXT) IS NULL OR scope = $2)
                ORDER BY created_at DESC
                LIMIT 1
            "#;
            let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [nup.into(), scope.into()]);
            entity::Model::find_by_statement(stmt).one(&self.db).await?
        };
        Ok(row.map(Into::into))
    }

    async fn claim_one(&self, locked_by: &str, lock_minutes: i64) -> Result<Option<ClaimedJob>, JobsError> {
        let sql = r#"
            UPDATE jobs
            SET status = 'running',
                locked_by = $1,
                locked_until = NOW() + ($2 * INTERVAL '1 minute'),
                attempts = attempts + 1,
                started_at = COALESCE(started_at, NOW()),
                updated_at = NOW()
            WHERE job_id = (
                SELECT job_id
                FROM jobs
                WHERE status IN ('queued', 'retry')
                  AND next_run_at <= NOW()
                  AND (locked_until IS NULL OR locked_until < NOW())
                ORDER BY priority DESC, next_run_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING job_id, nup, scope, requester, attempts, max_attempts
        "#;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [locked_by.into(), lock_minutes.into()],
        );
        let row = ClaimedJobRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn claim(
        &self,
        job_id: Uuid,
        locked_by: &str,
        lock_minutes: i64,
    ) -> Result<Option<ClaimedJob>, JobsError> {
        let sql = r#"
            UPDATE jobs
            SET status = 'running',
                locked_by = $1,
                locked_until = NOW() + ($2 * INTERVAL '1 minute'),
                attempts = attempts + 1,
                started_at = COALESCE(started_at, NOW()),
                updated_at = NOW()
            WHERE job_id = $3
              AND status IN ('queued', 'retry')
              AND next_run_at <= NOW()
              AND (locked_until IS NULL OR locked_until < NOW())
            RETURNING job_id, nup, scope, requester, attempts, max_attempts
        "#;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [locked_by.into(), lock_minutes.into(), job_id.into()],
        );
        let row = ClaimedJobRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn advance_stage(&self, job_id: Uuid, stage: JobStage, artifact_path: &str) -> Result<(), JobsError> {
        // The path column differs per stage; the column name can't be bound
        // as a parameter, so pick the static statement for this stage.
        let sql = match stage {
            JobStage::Extracted => {
                r#"UPDATE jobs SET status_stage = $2::job_stage, result_path_raw = $3, updated_at = NOW() WHERE job_id = $1"#
            }
            JobStage::Enriched => {
                r#"UPDATE jobs SET status_stage = $2::job_stage, result_path_enriched = $3, updated_at = NOW() WHERE job_id = $1"#
            }
            JobStage::Heur => {
                r#"UPDATE jobs SET status_stage = $2::job_stage, heur_path = $3, updated_at = NOW() WHERE job_id = $1"#
            }
            JobStage::Triage => {
                r#"UPDATE jobs SET status_stage = $2::job_stage, triage_path = $3, updated_at = NOW() WHERE job_id = $1"#
            }
            JobStage::Case => {
                r#"UPDATE jobs SET status_stage = $2::job_stage, case_path = $3, updated_at = NOW() WHERE job_id = $1"#
            }
            JobStage::Resumo => {
                r#"UPDATE jobs SET status_stage = $2::job_stage, resumo_path = $3, updated_at = NOW() WHERE job_id = $1"#
            }
        };
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [job_id.into(), stage.to_string().into(), artifact_path.into()],
        );
        self.db.execute(stmt).await?;
        Ok(())
    }

    async fn finish_done(
        &self,
        job_id: Uuid,
        result_json: serde_json::Value,
        result_path: Option<&str>,
    ) -> Result<(), JobsError> {
        let sql = r#"
            UPDATE jobs
            SET status = 'done',
                result_json = $2,
                result_path = $3,
                error = NULL,
                finished_at = NOW(),
                locked_by = NULL,
                locked_until = NULL,
                updated_at = NOW()
            WHERE job_id = $1
        "#;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [job_id.into(), result_json.into(), result_path.into()],
        );
        self.db.execute(stmt).await?;
        Ok(())
    }

    async fn finish_retry(&self, job_id: Uuid, error: &str, delay_seconds: i64) -> Result<(), JobsError> {
        let sql = r#"
            UPDATE jobs
            SET status = 'retry',
                error = $2,
                next_run_at = NOW() + ($3 * INTERVAL '1 second'),
                locked_by = NULL,
                locked_until = NULL,
                updated_at = NOW()
            WHERE job_id = $1
        "#;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [job_id.into(), error.into(), delay_seconds.into()],
        );
        self.db.execute(stmt).await?;
        Ok(())
    }

    async fn finish_error(&self, job_id: Uuid, error: &str) -> Result<(), JobsError> {
        let sql = r#"
            UPDATE jobs
            SET status = 'error',
                error = $2,
                finished_at = NOW(),
                locked_by = NULL,
                locked_until = NULL,
                updated_at = NOW()
            WHERE job_id = $1
        "#;
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [job_id.into(), error.into()]);
        self.db.execute(stmt).await?;
        Ok(())
    }

    async fn requeue_stale(&self) -> Result<Vec<(Uuid, i16)>, JobsError> {
        let sql = r#"
            UPDATE jobs
            SET status = 'retry',
                error = COALESCE(error, '') || E'\n[reaper] stale lock cleared',
                next_run_at = NOW() + (60 * INTERVAL '1 second'),
                locked_by = NULL,
                locked_until = NULL,
                updated_at = NOW()
            WHERE status = 'running'
              AND locked_until IS NOT NULL
              AND locked_until < NOW()
            RETURNING job_id, priority
        "#;
        #[derive(Debug, FromQueryResult)]
        struct RequeuedRow {
            job_id: Uuid,
            priority: i16,
        }
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, []);
        let rows = RequeuedRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows.into_iter().map(|r| (r.job_id, r.priority)).collect())
    }
}
