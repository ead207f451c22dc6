//! Job Worker Service - Entry Point
//!
//! Background worker that processes jobs from the `jobs:hi`/`jobs:lo` Redis
//! streams.

use std::sync::Arc;

use async_trait::async_trait;
use domain_jobs::pipeline::{CapabilityError, Credentials, Extractor, RawExtraction};

/// Placeholder for the document-extraction capability (spec.md §1: opaque,
/// out of scope). Deployments wire in a real `Extractor` that talks to the
/// process viewer this service sits in front of; this one fails every job
/// with a permanent error so a missing integration is loud, not silent.
struct UnimplementedExtractor;

#[async_trait]
impl Extractor for UnimplementedExtractor {
    async fn extract(&self, _nup: &str, _credentials: &Credentials) -> Result<RawExtraction, CapabilityError> {
        Err(CapabilityError::Permanent(
            "no Extractor configured for this deployment".to_string(),
        ))
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    job_worker::run(Arc::new(UnimplementedExtractor)).await
}
