use serde::{Deserialize, Serialize};

/// Top-level engine configuration, usually loaded from YAML.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DetectorConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub signals: SignalsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionConfig {
    #[serde(default)]
    pub level: DetectionLevel,
    #[serde(default = "default_true")]
    pub scan_enabled: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default = "default_true")]
    pub background_scan_enabled: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            level: DetectionLevel::default(),
            scan_enabled: true,
            notifications_enabled: true,
            background_scan_enabled: true,
        }
    }
}

/// User-selected sensitivity. Controls the confidence a result must exceed
/// before the final verdict may say phishing.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetectionLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl DetectionLevel {
    /// Acceptance threshold. Lower sensitivity demands more confidence.
    pub fn threshold(&self) -> f64 {
        match self {
            Self::Low => 0.7,
            Self::Medium => 0.5,
            Self::High => 0.3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for DetectionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DetectionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("Unknown detection level: {}", other)),
        }
    }
}

/// Per-capability adapter configuration. An absent section (or absent
/// credential) disables that adapter entirely; it is skipped, not retried.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SignalsConfig {
    pub reputation: Option<ReputationConfig>,
    pub generative: Option<GenerativeConfig>,
    pub remote_ml: Option<RemoteMlConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReputationConfig {
    /// API key; values starting with '$' resolve from the environment.
    pub api_key: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerativeConfig {
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteMlConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Crude backstop: the cache is cleared wholesale above this entry count.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: default_max_entries() }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_entries() -> usize {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_ordered_by_sensitivity() {
        assert_eq!(DetectionLevel::Low.threshold(), 0.7);
        assert_eq!(DetectionLevel::Medium.threshold(), 0.5);
        assert_eq!(DetectionLevel::High.threshold(), 0.3);
        assert!(DetectionLevel::High.threshold() < DetectionLevel::Low.threshold());
    }

    #[test]
    fn test_default_level_is_medium() {
        let config = DetectorConfig::default();
        assert_eq!(config.detection.level, DetectionLevel::Medium);
        assert!(config.detection.background_scan_enabled);
    }
}
