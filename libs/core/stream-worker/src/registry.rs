//! Stream configuration trait.
//!
//! `StreamJob` and `StreamProcessor` live in [`crate::worker`]; this module
//! holds `StreamDef`, the type-safe description of a stream's Redis keys and
//! polling defaults.

/// Stream configuration (type-safe constants)
///
/// Implement this trait to define your stream's Redis keys and settings.
///
/// # Example
///
/// ```ignore
/// struct EmailStream;
///
/// impl StreamDef for EmailStream {
///     const STREAM_NAME: &'static str = "email:jobs";
///     const CONSUMER_GROUP: &'static str = "email_workers";
///     const DLQ_STREAM: &'static str = "email:dlq";
///     const MAX_LENGTH: i64 = 100_000;
/// }
/// ```
pub trait StreamDef {
    /// The Redis stream name (e.g., "email:jobs")
    const STREAM_NAME: &'static str;

    /// The consumer group name (e.g., "email_workers")
    const CONSUMER_GROUP: &'static str;

    /// The dead letter queue stream name (e.g., "email:dlq")
    const DLQ_STREAM: &'static str;

    /// Maximum stream length before trimming (default: 100,000)
    const MAX_LENGTH: i64 = 100_000;

    /// Default poll interval in milliseconds (default: 1000)
    const POLL_INTERVAL_MS: u64 = 1000;

    /// Default batch size for reading messages (default: 10)
    const BATCH_SIZE: usize = 10;

    /// Claim timeout in milliseconds for abandoned messages (default: 30,000)
    const CLAIM_TIMEOUT_MS: u64 = 30_000;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestStream;

    impl StreamDef for TestStream {
        const STREAM_NAME: &'static str = "test:jobs";
        const CONSUMER_GROUP: &'static str = "test_workers";
        const DLQ_STREAM: &'static str = "test:dlq";
    }

    #[test]
    fn test_stream_def() {
        assert_eq!(TestStream::STREAM_NAME, "test:jobs");
        assert_eq!(TestStream::CONSUMER_GROUP, "test_workers");
        assert_eq!(TestStream::DLQ_STREAM, "test:dlq");
        assert_eq!(TestStream::MAX_LENGTH, 100_000);
    }
}
