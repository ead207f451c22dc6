//! The message carried on `jobs:hi`/`jobs:lo`: just enough to claim the row
//! (spec.md §4.2 — "the Queue only carries job identifiers and an advisory
//! priority hint").

use serde::{Deserialize, Serialize};
use stream_worker::StreamJob;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMessage {
    pub job_id: Uuid,
    pub priority_hint: i16,
    pub retry_count: u32,
}

impl JobMessage {
    pub fn new(job_id: Uuid, priority_hint: i16) -> Self {
        Self {
            job_id,
            priority_hint,
            retry_count: 0,
        }
    }
}

impl StreamJob for JobMessage {
    fn job_id(&self) -> String {
        self.job_id.to_string()
    }

    fn retry_count(&self) -> u32 {
        self.retry_count
    }

    fn with_retry(&self) -> Self {
        Self {
            retry_count: self.retry_count + 1,
            ..self.clone()
        }
    }

    fn max_retries(&self) -> u32 {
        // The row, not the stream, owns business retries (§4.3): this bound
        // only protects against a message that can never be claimed at all.
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_round_trips() {
        let id = Uuid::new_v4();
        let msg = JobMessage::new(id, 9);
        assert_eq!(msg.job_id(), id.to_string());
    }

    #[test]
    fn with_retry_preserves_identity() {
        let msg = JobMessage::new(Uuid::new_v4(), 5);
        let retried = msg.with_retry();
        assert_eq!(retried.retry_count, 1);
        assert_eq!(retried.job_id, msg.job_id);
    }
}
