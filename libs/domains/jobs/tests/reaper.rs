//! Covers the reaper-rescue scenario (spec.md §8 scenario 4) and the
//! exhausted-retries scenario (scenario 5) against a real Postgres.

mod support;

use domain_jobs::repository::NewJob;
use domain_jobs::{JobRepository, JobStatus, PgJobRepository};
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use support::TestDatabase;

async fn insert_job(repo: &PgJobRepository, nup: &str, max_attempts: i32) -> uuid::Uuid {
    repo.insert(NewJob {
        nup: nup.to_string(),
        scope: None,
        requester: None,
        mode: "detalhar".to_string(),
        priority: 5,
        max_attempts,
        dedup_key: format!("dedup-{nup}"),
    })
    .await
    .unwrap()
}

/// Backdates `locked_until` into the past, simulating a worker that
/// crashed mid-lease.
async fn expire_lock(db: &sea_orm::DatabaseConnection, job_id: uuid::Uuid) {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        "UPDATE jobs SET locked_until = NOW() - INTERVAL '1 minute' WHERE job_id = $1",
        [job_id.into()],
    );
    db.execute(stmt).await.unwrap();
}

#[tokio::test]
async fn reaper_reclaims_a_stale_running_lease() {
    let db = TestDatabase::new().await;
    let repo = PgJobRepository::new(db.connection());

    let job_id = insert_job(&repo, "0609.012097.00200/2026-10", 3).await;
    repo.claim(job_id, "worker-1", 15).await.unwrap().expect("claim should succeed");
    expire_lock(&db.connection(), job_id).await;

    let reclaimed = repo.requeue_stale().await.unwrap();
    assert_eq!(reclaimed.len(), 1);
    assert_eq!(reclaimed[0].0, job_id);

    let job = repo.get_by_id(job_id).await.unwrap().expect("job should still exist");
    assert_eq!(job.status, JobStatus::Retry);
    assert!(job.locked_by.is_none());
    assert!(job.locked_until.is_none());
    assert!(job.error.unwrap().contains("stale lock"));
}

#[tokio::test]
async fn reaper_leaves_fresh_leases_alone() {
    let db = TestDatabase::new().await;
    let repo = PgJobRepository::new(db.connection());

    let job_id = insert_job(&repo, "0609.012097.00201/2026-11", 3).await;
    repo.claim(job_id, "worker-1", 15).await.unwrap().expect("claim should succeed");

    let reclaimed = repo.requeue_stale().await.unwrap();
    assert!(reclaimed.is_empty());

    let job = repo.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Running);
}

#[tokio::test]
async fn attempts_never_exceed_max_attempts_after_exhausted_retries() {
    let db = TestDatabase::new().await;
    let repo = PgJobRepository::new(db.connection());

    let job_id = insert_job(&repo, "0609.012097.00202/2026-12", 3).await;

    for _ in 0..3 {
        let claimed = repo
            .claim(job_id, "worker-1", 15)
            .await
            .unwrap()
            .expect("job should be claimable while attempts < max_attempts");
        if claimed.attempts < claimed.max_attempts {
            repo.finish_retry(job_id, "transient failure", 0).await.unwrap();
        }
    }

    let job = repo.get_by_id(job_id).await.unwrap().unwrap();
    assert!(job.attempts <= job.max_attempts);

    repo.finish_error(job_id, "transient failure").await.unwrap();
    let job = repo.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Error);
    assert!(job.finished_at.is_some());
    assert_eq!(job.attempts, job.max_attempts);
}
