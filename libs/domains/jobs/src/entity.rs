use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{JobStage, JobStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
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
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub started_at: Option<DateTimeWithTimeZone>,
    pub finished_at: Option<DateTimeWithTimeZone>,
    pub next_run_at: DateTimeWithTimeZone,
    pub locked_by: Option<String>,
    pub locked_until: Option<DateTimeWithTimeZone>,
    pub error: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub result_json: Option<serde_json::Value>,
    pub result_path: Option<String>,
    pub result_path_raw: Option<String>,
    pub result_path_enriched: Option<String>,
    pub heur_path: Option<String>,
    pub triage_path: Option<String>,
    pub case_path: Option<String>,
    pub resumo_path: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Job {
    fn from(m: Model) -> Self {
        Self {
            job_id: m.job_id,
            nup: m.nup,
            scope: m.scope,
            requester: m.requester,
            mode: m.mode,
            status: m.status,
            status_stage: m.status_stage,
            priority: m.priority,
            attempts: m.attempts,
            max_attempts: m.max_attempts,
            dedup_key: m.dedup_key,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
            started_at: m.started_at.map(|t| t.with_timezone(&Utc)),
            finished_at: m.finished_at.map(|t| t.with_timezone(&Utc)),
            next_run_at: m.next_run_at.with_timezone(&Utc),
            locked_by: m.locked_by,
            locked_until: m.locked_until.map(|t| t.with_timezone(&Utc)),
            error: m.error,
            result_json: m.result_json,
            result_path: m.result_path,
            result_path_raw: m.result_path_raw,
            result_path_enriched: m.result_path_enriched,
            heur_path: m.heur_path,
            triage_path: m.triage_path,
            case_path: m.case_path,
            resumo_path: m.resumo_path,
        }
    }
}

impl database::UuidEntity for Entity {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn model_converts_to_domain_job() {
        let now = Utc::now().into();
        let model = Model {
            job_id: Uuid::new_v4(),
            nup: "0000000-00.2024.8.26.0100".to_string(),
            scope: None,
            requester: Some("chat-1".to_string()),
            mode: "detalhar".to_string(),
            status: JobStatus::Queued,
            status_stage: None,
            priority: 5,
            attempts: 0,
            max_attempts: 3,
            dedup_key: "a".repeat(40),
            created_at: now,
            updated_at: now,
            started_at: None,
            finished_at: None,
            next_run_at: now,
            locked_by: None,
            locked_until: None,
            error: None,
            result_json: None,
            result_path: None,
            result_path_raw: None,
            result_path_enriched: None,
            heur_path: None,
            triage_path: None,
            case_path: None,
            resumo_path: None,
        };

        let job: crate::models::Job = model.into();
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.requester.as_deref(), Some("chat-1"));
    }
}
