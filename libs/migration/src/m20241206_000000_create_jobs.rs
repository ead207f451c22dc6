use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(JobStatus::Enum)
                    .values([
                        JobStatus::Queued,
                        JobStatus::Running,
                        JobStatus::Retry,
                        JobStatus::Done,
                        JobStatus::Error,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(JobStage::Enum)
                    .values([
                        JobStage::Extracted,
                        JobStage::Enriched,
                        JobStage::Heur,
                        JobStage::Triage,
                        JobStage::Case,
                        JobStage::Resumo,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(pk_uuid(Jobs::JobId))
                    .col(string(Jobs::Nup))
                    .col(string_null(Jobs::Scope))
                    .col(string_null(Jobs::Requester))
                    .col(string(Jobs::Mode))
                    .col(
                        ColumnDef::new(Jobs::Status)
                            .enumeration(
                                JobStatus::Enum,
                                [
                                    JobStatus::Queued,
                                    JobStatus::Running,
                                    JobStatus::Retry,
                                    JobStatus::Done,
                                    JobStatus::Error,
                                ],
                            )
                            .not_null()
                            .default("queued"),
                    )
                    .col(
                        ColumnDef::new(Jobs::StatusStage)
                            .enumeration(
                                JobStage::Enum,
                                [
                                    JobStage::Extracted,
                                    JobStage::Enriched,
                                    JobStage::Heur,
                                    JobStage::Triage,
                                    JobStage::Case,
                                    JobStage::Resumo,
                                ],
                            )
                            .null(),
                    )
                    .col(small_integer(Jobs::Priority).default(5))
                    .col(integer(Jobs::Attempts).default(0))
                    .col(integer(Jobs::MaxAttempts).default(3))
                    .col(char_len(Jobs::DedupKey, 40))
                    .col(
                        timestamp_with_time_zone(Jobs::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Jobs::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(Jobs::StartedAt))
                    .col(timestamp_with_time_zone_null(Jobs::FinishedAt))
                    .col(
                        timestamp_with_time_zone(Jobs::NextRunAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(string_null(Jobs::LockedBy))
                    .col(timestamp_with_time_zone_null(Jobs::LockedUntil))
                    .col(text_null(Jobs::Error))
                    .col(json_binary_null(Jobs::ResultJson))
                    .col(text_null(Jobs::ResultPath))
                    .col(text_null(Jobs::ResultPathRaw))
                    .col(text_null(Jobs::ResultPathEnriched))
                    .col(text_null(Jobs::HeurPath))
                    .col(text_null(Jobs::TriagePath))
                    .col(text_null(Jobs::CasePath))
                    .col(text_null(Jobs::ResumoPath))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_dedup_key")
                    .table(Jobs::Table)
                    .col(Jobs::DedupKey)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_status_next_run_at")
                    .table(Jobs::Table)
                    .col(Jobs::Status)
                    .col(Jobs::NextRunAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_nup")
                    .table(Jobs::Table)
                    .col(Jobs::Nup)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER jobs_touch_updated_at
                    BEFORE UPDATE ON jobs
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS jobs_touch_updated_at ON jobs")
            .await?;

        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(JobStage::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(JobStatus::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    JobId,
    Nup,
    Scope,
    Requester,
    Mode,
    Status,
    StatusStage,
    Priority,
    Attempts,
    MaxAttempts,
    DedupKey,
    CreatedAt,
    UpdatedAt,
    StartedAt,
    FinishedAt,
    NextRunAt,
    LockedBy,
    LockedUntil,
    Error,
    ResultJson,
    ResultPath,
    ResultPathRaw,
    ResultPathEnriched,
    HeurPath,
    TriagePath,
    CasePath,
    ResumoPath,
}

#[derive(DeriveIden)]
enum JobStatus {
    #[sea_orm(iden = "job_status")]
    Enum,
    #[sea_orm(iden = "queued")]
    Queued,
    #[sea_orm(iden = "running")]
    Running,
    #[sea_orm(iden = "retry")]
    Retry,
    #[sea_orm(iden = "done")]
    Done,
    #[sea_orm(iden = "error")]
    Error,
}

#[derive(DeriveIden)]
enum JobStage {
    #[sea_orm(iden = "job_stage")]
    Enum,
    #[sea_orm(iden = "extracted")]
    Extracted,
    #[sea_orm(iden = "enriched")]
    Enriched,
    #[sea_orm(iden = "heur")]
    Heur,
    #[sea_orm(iden = "triage")]
    Triage,
    #[sea_orm(iden = "case")]
    Case,
    #[sea_orm(iden = "resumo")]
    Resumo,
}
