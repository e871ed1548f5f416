use serde::{Deserialize, Serialize};

use super::signal::{SignalOrigin, SignalResult};

/// The orchestrator's final output for a subject.
///
/// Invariant: `is_phishing` is true only if `confidence` exceeded
/// `threshold_applied` at decision time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_phishing: bool,
    pub confidence: f64,
    pub source: SignalOrigin,
    pub details: Option<String>,
    pub threshold_applied: f64,
}

impl Verdict {
    pub fn from_signal(signal: SignalResult, threshold: f64) -> Self {
        Self {
            is_phishing: signal.is_phishing,
            confidence: signal.confidence,
            source: signal.source,
            details: signal.details,
            threshold_applied: threshold,
        }
    }
}
