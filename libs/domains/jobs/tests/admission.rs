//! Covers the admission algorithm (spec.md §4.1) end to end against a real
//! Postgres + Redis, the way `libs/testing/test-utils` exercises the rest
//! of this workspace: dedup cache hit, active-job dedup with user-click
//! escalation, and the `force` bypass.

mod support;

use domain_jobs::{EnqueueRequest, JobService, JobSource, JobStatus};
use stream_worker::StreamProducer;
use support::{TestDatabase, TestRedis};

struct Env {
    _db: TestDatabase,
    _redis: TestRedis,
    service: JobService<domain_jobs::PgJobRepository>,
}

async fn setup() -> Env {
    let db = TestDatabase::new().await;
    let redis = TestRedis::new().await;

    let repository = domain_jobs::PgJobRepository::new(db.connection());
    let hi = StreamProducer::new(redis.manager(), "jobs:hi");
    let lo = StreamProducer::new(redis.manager(), "jobs:lo");
    let service = JobService::new(repository, hi, lo, 43_200);

    Env { _db: db, _redis: redis, service }
}

fn base_request(nup: &str) -> EnqueueRequest {
    EnqueueRequest {
        nup: nup.to_string(),
        scope: None,
        chat_id: Some("chat-1".to_string()),
        user_id: None,
        priority: 5,
        max_attempts: 3,
        source: JobSource::Monitor,
        force: false,
        mode: "detalhar".to_string(),
    }
}

#[tokio::test]
async fn cold_enqueue_is_queued_and_not_deduplicated() {
    let env = setup().await;

    let resp = env
        .service
        .enqueue(base_request("0609.012097.00016/2026-69"))
        .await
        .expect("enqueue should succeed");

    assert_eq!(resp.status, JobStatus::Queued);
    assert!(!resp.dedup);
}

#[tokio::test]
async fn repeat_enqueue_of_in_flight_job_is_deduplicated() {
    let env = setup().await;
    let nup = "0609.012097.00099/2026-01";

    let first = env.service.enqueue(base_request(nup)).await.unwrap();
    let second = env.service.enqueue(base_request(nup)).await.unwrap();

    assert_eq!(first.job_id, second.job_id);
    assert!(second.dedup);
}

#[tokio::test]
async fn user_click_escalates_priority_and_returns_same_job_id() {
    let env = setup().await;
    let nup = "0609.012097.00100/2026-02";

    let queued = env.service.enqueue(base_request(nup)).await.unwrap();

    let mut escalated = base_request(nup);
    escalated.source = JobSource::UserClick;
    escalated.priority = 5;
    let resp = env.service.enqueue(escalated).await.unwrap();

    assert_eq!(resp.job_id, queued.job_id);
    assert!(resp.dedup);

    let job = env.service.get_job(resp.job_id).await.unwrap();
    assert_eq!(job.priority, domain_jobs::service::ESCALATION_PRIORITY);
}

#[tokio::test]
async fn force_always_creates_a_new_distinct_job() {
    let env = setup().await;
    let nup = "0609.012097.00101/2026-03";

    let first = env.service.enqueue(base_request(nup)).await.unwrap();

    let mut forced = base_request(nup);
    forced.force = true;
    let second = env.service.enqueue(forced).await.unwrap();

    assert_ne!(first.job_id, second.job_id);
    assert!(!second.dedup);
}

#[tokio::test]
async fn cache_lookup_reports_miss_before_any_job_completes() {
    let env = setup().await;
    let nup = "0609.012097.00102/2026-04";

    env.service.enqueue(base_request(nup)).await.unwrap();
    let lookup = env.service.cache_lookup(nup, None).await.unwrap();

    assert!(!lookup.hit);
}
