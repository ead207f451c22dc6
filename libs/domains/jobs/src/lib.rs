pub mod artifacts;
pub mod dedup;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod postgres;
pub mod processor;
pub mod repository;
pub mod service;
pub mod stream_models;
pub mod streams;

pub use entity::Entity as JobEntity;
pub use error::JobsError;
pub use models::{EnqueueRequest, EnqueueResponse, Job, JobResponse, JobSource, JobStage, JobStatus};
pub use postgres::PgJobRepository;
pub use processor::JobProcessor;
pub use repository::JobRepository;
pub use service::JobService;
pub use stream_models::JobMessage;
pub use streams::{HiStream, LoStream};
