use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Durable job status.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "job_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    #[default]
    #[sea_orm(string_value = "queued")]
    Queued,
    #[sea_orm(string_value = "running")]
    Running,
    #[sea_orm(string_value = "retry")]
    Retry,
    #[sea_orm(string_value = "done")]
    Done,
    #[sea_orm(string_value = "error")]
    Error,
}

/// Progress marker within a `running` attempt. Monotonic within one attempt
/// (see invariant 5): observed values over a single run form a prefix of
/// `[Extracted, Enriched, Heur, Triage, Case, Resumo]`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "job_stage")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStage {
    #[sea_orm(string_value = "extracted")]
    Extracted,
    #[sea_orm(string_value = "enriched")]
    Enriched,
    #[sea_orm(string_value = "heur")]
    Heur,
    #[sea_orm(string_value = "triage")]
    Triage,
    #[sea_orm(string_value = "case")]
    Case,
    #[sea_orm(string_value = "resumo")]
    Resumo,
}

/// How a job was admitted: drives which stream it is pushed onto and
/// whether the user-click escalation rule applies (spec.md §4.1 step 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobSource {
    Monitor,
    UserClick,
}

/// The durable row: the authoritative state of one job (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Job {
    pub job_id: Uuid,
    pub nup: String,
    pub scope: Option<String>,
    pub requester: Option<String>,
    pub mode: String,
    pub status: JobStatus,
    pub status_stage: Option<JobStage>,
    pub priority: i16,
    pub attempts: i32,
    pub max_attempts: i32,
    pub dedup_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub next_run_at: DateTime<Utc>,
    pub locked_by: Option<String>,
    pub locked_until: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub result_json: Option<serde_json::Value>,
    pub result_path: Option<String>,
    pub result_path_raw: Option<String>,
    pub result_path_enriched: Option<String>,
    pub heur_path: Option<String>,
    pub triage_path: Option<String>,
    pub case_path: Option<String>,
    pub resumo_path: Option<String>,
}

/// `POST /enqueue` request body (spec.md §6).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EnqueueRequest {
    #[validate(length(min = 1, max = 64))]
    pub nup: String,
    pub scope: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default = "default_priority")]
    #[validate(range(min = 0, max = 10))]
    pub priority: i16,
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: i32,
    pub source: JobSource,
    #[serde(default)]
    pub force: bool,
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_priority() -> i16 {
    5
}

fn default_max_attempts() -> i32 {
    3
}

fn default_mode() -> String {
    "detalhar".to_string()
}

impl EnqueueRequest {
    /// The opaque requester identifier: whichever of `chat_id`/`user_id` was
    /// supplied, collapsed into spec.md's single `requester` column.
    pub fn requester(&self) -> Option<String> {
        self.chat_id.clone().or_else(|| self.user_id.clone())
    }
}

/// `POST /enqueue` response (spec.md §4.1).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnqueueResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub dedup: bool,
    pub message: String,
}

/// `GET /jobs/{job_id}` row projection (spec.md §4.1).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobResponse {
    pub job_id: Uuid,
    pub nup: String,
    pub scope: Option<String>,
    pub status: JobStatus,
    pub status_stage: Option<JobStage>,
    pub priority: i16,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub result_path: Option<String>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.job_id,
            nup: job.nup,
            scope: job.scope,
            status: job.status,
            status_stage: job.status_stage,
            priority: job.priority,
            attempts: job.attempts,
            max_attempts: job.max_attempts,
            created_at: job.created_at,
            updated_at: job.updated_at,
            started_at: job.started_at,
            finished_at: job.finished_at,
            error: job.error,
            result_path: job.result_path,
        }
    }
}

/// `GET /nup/{nup}/cache` response (spec.md §4.1).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CacheLookupResponse {
    pub hit: bool,
    pub job_id: Option<Uuid>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requester_prefers_chat_id_over_user_id() {
        let req = EnqueueRequest {
            nup: "X".to_string(),
            scope: None,
            chat_id: Some("chat-1".to_string()),
            user_id: Some("user-1".to_string()),
            priority: 5,
            max_attempts: 3,
            source: JobSource::Monitor,
            force: false,
            mode: "detalhar".to_string(),
        };
        assert_eq!(req.requester(), Some("chat-1".to_string()));
    }

    #[test]
    fn requester_falls_back_to_user_id() {
        let req = EnqueueRequest {
            nup: "X".to_string(),
            scope: None,
            chat_id: None,
            user_id: Some("user-1".to_string()),
            priority: 5,
            max_attempts: 3,
            source: JobSource::Monitor,
            force: false,
            mode: "detalhar".to_string(),
        };
        assert_eq!(req.requester(), Some("user-1".to_string()));
    }

    #[test]
    fn job_stage_round_trips_through_serde() {
        let stage = JobStage::Triage;
        let json = serde_json::to_string(&stage).unwrap();
        assert_eq!(json, "\"triage\"");
        let back: JobStage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stage);
    }
}
