//! PhishGuard: a phishing detection orchestration and caching engine.
//!
//! Heterogeneous signal sources (URL reputation, generative-text analysis,
//! a remote ML endpoint) are sequenced in fixed precedence with a local
//! weighted-rule scorer as the always-available fallback. Verdicts are
//! deduplicated through a TTL cache, passive scans drain through a
//! single-worker queue, and outcomes roll up into detection statistics.

pub mod cache;
pub mod cli;
pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod features;
pub mod models;
pub mod scorer;
pub mod signals;
pub mod stats;

pub use engine::{BackgroundScanner, DetectionEngine, DetectionEvent};
pub use errors::PhishGuardError;
pub use models::{Subject, Verdict};
