use async_trait::async_trait;

use crate::models::{SignalOutcome, Subject};

/// One external capability contributing an opinion toward a verdict.
///
/// Contract: `query` never panics and never surfaces transport errors.
/// Missing credentials, network failures, non-success responses and
/// malformed payloads all come back as `Err(Unavailable)`, logged at this
/// boundary; only usable results cross into the orchestrator.
#[async_trait]
pub trait SignalSource: Send + Sync {
    async fn query(&self, subject: &Subject) -> SignalOutcome;

    /// Source name for logging.
    fn source_name(&self) -> &str;
}
