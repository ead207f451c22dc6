//! Stream definitions for the jobs domain: the two-priority queue of §4.2.
//!
//! `StreamDef` associated consts give the compile-time defaults; `STREAM_HI`,
//! `STREAM_LO`, `CONSUMER_GROUP` and `CONSUMER_NAME` (spec.md's Environment
//! section) override them at process startup, read once by the functions
//! below rather than threaded through the trait.

use stream_worker::StreamDef;

/// High-priority stream: user-interactive escalations land here.
pub struct HiStream;

impl StreamDef for HiStream {
    const STREAM_NAME: &'static str = "jobs:hi";
    const CONSUMER_GROUP: &'static str = "job_workers";
    const DLQ_STREAM: &'static str = "jobs:hi:dlq";
    const MAX_LENGTH: i64 = 100_000;
}

/// Low-priority stream: background/monitor admissions and reaper requeues.
pub struct LoStream;

impl StreamDef for LoStream {
    const STREAM_NAME: &'static str = "jobs:lo";
    const CONSUMER_GROUP: &'static str = "job_workers";
    const DLQ_STREAM: &'static str = "jobs:lo:dlq";
    const MAX_LENGTH: i64 = 100_000;
}

/// `STREAM_HI` env override, falling back to `HiStream::STREAM_NAME`.
pub fn stream_hi_name() -> String {
    std::env::var("STREAM_HI").unwrap_or_else(|_| HiStream::STREAM_NAME.to_string())
}

/// `STREAM_LO` env override, falling back to `LoStream::STREAM_NAME`.
pub fn stream_lo_name() -> String {
    std::env::var("STREAM_LO").unwrap_or_else(|_| LoStream::STREAM_NAME.to_string())
}

/// `CONSUMER_GROUP` env override, falling back to `HiStream::CONSUMER_GROUP`
/// (both streams share one group name).
pub fn consumer_group_name() -> String {
    std::env::var("CONSUMER_GROUP").unwrap_or_else(|_| HiStream::CONSUMER_GROUP.to_string())
}

/// `CONSUMER_NAME` env override, identifying this process within the
/// consumer group. `None` means the caller falls back to its own default
/// (e.g. the service name).
pub fn consumer_name() -> Option<String> {
    std::env::var("CONSUMER_NAME").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hi_stream_def() {
        assert_eq!(HiStream::STREAM_NAME, "jobs:hi");
        assert_eq!(HiStream::CONSUMER_GROUP, "job_workers");
        assert_eq!(HiStream::DLQ_STREAM, "jobs:hi:dlq");
    }

    #[test]
    fn lo_stream_def() {
        assert_eq!(LoStream::STREAM_NAME, "jobs:lo");
        assert_eq!(LoStream::DLQ_STREAM, "jobs:lo:dlq");
    }

    #[test]
    fn stream_names_fall_back_to_defaults_when_unset() {
        temp_env::with_vars([("STREAM_HI", None::<&str>), ("STREAM_LO", None::<&str>)], || {
            assert_eq!(stream_hi_name(), "jobs:hi");
            assert_eq!(stream_lo_name(), "jobs:lo");
        });
    }

    #[test]
    fn stream_names_honor_env_override() {
        temp_env::with_vars(
            [("STREAM_HI", Some("custom:hi")), ("STREAM_LO", Some("custom:lo"))],
            || {
                assert_eq!(stream_hi_name(), "custom:hi");
                assert_eq!(stream_lo_name(), "custom:lo");
            },
        );
    }

    #[test]
    fn consumer_group_falls_back_to_default_when_unset() {
        temp_env::with_var_unset("CONSUMER_GROUP", || {
            assert_eq!(consumer_group_name(), "job_workers");
        });
    }

    #[test]
    fn consumer_group_honors_env_override() {
        temp_env::with_var("CONSUMER_GROUP", Some("custom_group"), || {
            assert_eq!(consumer_group_name(), "custom_group");
        });
    }

    #[test]
    fn consumer_name_is_none_when_unset() {
        temp_env::with_var_unset("CONSUMER_NAME", || {
            assert_eq!(consumer_name(), None);
        });
    }

    #[test]
    fn consumer_name_honors_env_override() {
        temp_env::with_var("CONSUMER_NAME", Some("worker-7"), || {
            assert_eq!(consumer_name(), Some("worker-7".to_string()));
        });
    }
}
