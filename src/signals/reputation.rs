use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::source::SignalSource;
use crate::config::ReputationConfig;
use crate::models::{SignalOrigin, SignalOutcome, SignalResult, Subject, Unavailable};

const DEFAULT_BASE_URL: &str = "https://www.virustotal.com/api/v3";

/// Settle time between submitting a URL and polling the analysis verdict.
/// This is documented internal latency of the two-leg protocol, not a retry
/// policy; callers see one logical query.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// URL reputation lookup backed by a scan-aggregation service. Internally a
/// submit-then-poll protocol; presented to the orchestrator as one call.
pub struct ReputationSource {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ReputationSource {
    pub fn new(config: &ReputationConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    async fn lookup(&self, url: &str) -> SignalOutcome {
        let submit = self
            .client
            .post(format!("{}/urls", self.base_url))
            .header("x-apikey", &self.api_key)
            .form(&[("url", url)])
            .send()
            .await
            .map_err(|e| Unavailable::new(format!("submit failed: {}", e)))?;

        if !submit.status().is_success() {
            return Err(Unavailable::new(format!(
                "submit returned {}",
                submit.status()
            )));
        }

        let submit_data: Value = submit
            .json()
            .await
            .map_err(|e| Unavailable::new(format!("malformed submit payload: {}", e)))?;
        let analysis_id = submit_data["data"]["id"]
            .as_str()
            .ok_or_else(|| Unavailable::new("submit payload missing analysis id"))?
            .to_string();

        tokio::time::sleep(SETTLE_DELAY).await;

        let result = self
            .client
            .get(format!("{}/analyses/{}", self.base_url, analysis_id))
            .header("x-apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| Unavailable::new(format!("analysis fetch failed: {}", e)))?;

        if !result.status().is_success() {
            return Err(Unavailable::new(format!(
                "analysis returned {}",
                result.status()
            )));
        }

        let data: Value = result
            .json()
            .await
            .map_err(|e| Unavailable::new(format!("malformed analysis payload: {}", e)))?;

        Ok(interpret_analysis(&data))
    }
}

const BAD_CATEGORIES: [&str; 5] = ["phishing", "malicious", "malware", "suspicious", "spam"];

/// Map an analysis document to a signal. Engine hit counts scale confidence
/// from a 0.6 base; a bad category without engine hits lands at a fixed 0.9.
fn interpret_analysis(data: &Value) -> SignalResult {
    let attributes = &data["data"]["attributes"];
    let stats = &attributes["stats"];
    let malicious = stats["malicious"].as_u64().unwrap_or(0);
    let suspicious = stats["suspicious"].as_u64().unwrap_or(0);

    if malicious > 0 || suspicious > 0 {
        let confidence = (0.6 + malicious as f64 * 0.1 + suspicious as f64 * 0.05).min(0.98);
        return SignalResult {
            is_phishing: true,
            confidence,
            source: SignalOrigin::Reputation,
            details: Some(format!("{} engines detected as malicious", malicious)),
        };
    }

    let bad_category = attributes["categories"].as_object().and_then(|categories| {
        categories.iter().find_map(|(engine, category)| {
            category.as_str().and_then(|c| {
                let lower = c.to_lowercase();
                BAD_CATEGORIES
                    .iter()
                    .any(|bad| lower.contains(bad))
                    .then(|| format!("Categorized as {} by {}", c, engine))
            })
        })
    });

    match bad_category {
        Some(details) => SignalResult {
            is_phishing: true,
            confidence: 0.9,
            source: SignalOrigin::Reputation,
            details: Some(details),
        },
        None => SignalResult::benign(SignalOrigin::Reputation),
    }
}

#[async_trait]
impl SignalSource for ReputationSource {
    async fn query(&self, subject: &Subject) -> SignalOutcome {
        let url = match subject {
            Subject::Url { url } => url,
            _ => return Err(Unavailable::new("reputation source only scores URLs")),
        };

        match self.lookup(url).await {
            Ok(result) => {
                debug!(
                    is_phishing = result.is_phishing,
                    confidence = result.confidence,
                    "Reputation lookup completed"
                );
                Ok(result)
            }
            Err(unavailable) => {
                warn!(reason = %unavailable, "Reputation source unavailable");
                Err(unavailable)
            }
        }
    }

    fn source_name(&self) -> &str {
        "reputation"
    }
}
