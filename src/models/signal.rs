use serde::{Deserialize, Serialize};

/// Which capability produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalOrigin {
    Reputation,
    Generative,
    Ml,
    Local,
    Error,
}

impl SignalOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reputation => "reputation",
            Self::Generative => "generative",
            Self::Ml => "ml",
            Self::Local => "local",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for SignalOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source's opinion about a subject. Produced whole by exactly one
/// adapter or the local scorer, never partially filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub is_phishing: bool,
    pub confidence: f64,
    pub source: SignalOrigin,
    pub details: Option<String>,
}

impl SignalResult {
    pub fn benign(source: SignalOrigin) -> Self {
        Self { is_phishing: false, confidence: 0.0, source, details: None }
    }
}

/// A signal source that could not produce an opinion. Always recoverable:
/// the orchestrator moves to the next source or the local scorer.
#[derive(Debug, Clone)]
pub struct Unavailable {
    pub reason: String,
}

impl Unavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl std::fmt::Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

pub type SignalOutcome = Result<SignalResult, Unavailable>;
