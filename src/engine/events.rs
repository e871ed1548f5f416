use crate::models::Verdict;
use crate::stats::DetectionStats;

/// Identity of the thing being scanned passively (e.g. a browser tab id).
pub type ScanHandle = u64;

/// Messages emitted toward the UI/browser-integration collaborator.
#[derive(Debug, Clone)]
pub enum DetectionEvent {
    /// A decision finished for a queued subject. The consumer owns the
    /// badge/notification side effects.
    VerdictReady {
        handle: ScanHandle,
        url: String,
        verdict: Verdict,
    },
    /// Counters changed after a decision.
    StatsUpdated { stats: DetectionStats },
}
