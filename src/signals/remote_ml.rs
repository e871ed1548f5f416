use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::source::SignalSource;
use crate::config::RemoteMlConfig;
use crate::errors::{with_retry, PhishGuardError, RetryConfig};
use crate::features;
use crate::models::{SignalOrigin, SignalOutcome, SignalResult, Subject, Unavailable};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct MlReply {
    is_phishing: bool,
    confidence: f64,
    details: Option<String>,
}

/// Remote classification endpoint. Receives the subject plus its extracted
/// feature record; any failure degrades to the local scorer upstream.
///
/// Transient transport errors get one bounded retry before the source
/// reports itself unavailable.
pub struct RemoteMlSource {
    client: Client,
    endpoint: String,
    retry: RetryConfig,
}

impl RemoteMlSource {
    pub fn new(config: &RemoteMlConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.clone(),
            retry: RetryConfig::default(),
        }
    }

    async fn post_classification(&self, body: &serde_json::Value) -> Result<reqwest::Response, PhishGuardError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PhishGuardError::Timeout(format!("classification request: {}", e))
                } else {
                    PhishGuardError::Network(format!("classification request: {}", e))
                }
            })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::TOO_MANY_REQUESTS => {
                Err(PhishGuardError::RateLimit("classification endpoint".into()))
            }
            status => Err(PhishGuardError::SignalApi(format!("endpoint returned {}", status))),
        }
    }
}

#[async_trait]
impl SignalSource for RemoteMlSource {
    async fn query(&self, subject: &Subject) -> SignalOutcome {
        let body = json!({
            "type": subject.kind().as_str(),
            "subject": subject,
            "features": features::extract(subject),
        });

        let response = with_retry("remote-ml classify", &self.retry, || {
            self.post_classification(&body)
        })
        .await
        .map_err(|e| {
            let unavailable = Unavailable::new(e.to_string());
            warn!(reason = %unavailable, "Remote ML source unavailable");
            unavailable
        })?;

        let reply: MlReply = response
            .json()
            .await
            .map_err(|e| Unavailable::new(format!("malformed payload: {}", e)))?;

        debug!(
            is_phishing = reply.is_phishing,
            confidence = reply.confidence,
            "Remote ML classification completed"
        );

        Ok(SignalResult {
            is_phishing: reply.is_phishing,
            confidence: reply.confidence.clamp(0.0, 1.0),
            source: SignalOrigin::Ml,
            details: reply.details,
        })
    }

    fn source_name(&self) -> &str {
        "remote-ml"
    }
}
