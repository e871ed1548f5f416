use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::source::SignalSource;
use crate::config::credentials::redact_credentials;
use crate::config::GenerativeConfig;
use crate::models::{SignalOrigin, SignalOutcome, SignalResult, Subject, Unavailable};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-pro";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Text subjects are clipped before prompting; phishing framing lives in the
/// opening of a page, not its tail.
const TEXT_CLIP: usize = 1500;

/// Generative-text analysis of a subject. The model's free-form reply is
/// parsed defensively: first embedded JSON object wins, then a coarse
/// keyword fallback, never a hard failure.
pub struct GenerativeSource {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GenerativeSource {
    pub fn new(config: &GenerativeConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn prompt_for(subject: &Subject) -> String {
        const FORMAT: &str = "Return JSON format only with properties: isPhishing (boolean), \
                              confidence (number between 0-1), and reason (text)";
        match subject {
            Subject::Url { url } => format!(
                "Analyze this URL for phishing indicators. {}: {}",
                FORMAT, url
            ),
            Subject::Text { content, .. } => format!(
                "Analyze this text from a webpage for phishing or scam indicators. {}: {}",
                FORMAT,
                clip(content)
            ),
            Subject::Form(form) => format!(
                "Analyze this form data for phishing indicators. {}: {}",
                FORMAT,
                serde_json::to_string(form).unwrap_or_default()
            ),
            Subject::Message { text, platform } => format!(
                "Analyze this {} message for phishing or scam indicators. {}: {}",
                platform,
                FORMAT,
                clip(text)
            ),
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, Unavailable> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.1,
                "topK": 16,
                "topP": 0.1,
                "maxOutputTokens": 256
            }
        });

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent?key={}",
                self.base_url, self.model, self.api_key
            ))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // Transport errors can echo the request URL, key included
                Unavailable::new(redact_credentials(
                    &format!("request failed: {}", e),
                    &[&self.api_key],
                ))
            })?;

        if !response.status().is_success() {
            return Err(Unavailable::new(format!(
                "completion returned {}",
                response.status()
            )));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| Unavailable::new(format!("malformed payload: {}", e)))?;

        Ok(data["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("")
            .to_string())
    }
}

fn clip(text: &str) -> &str {
    match text.char_indices().nth(TEXT_CLIP) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Extract the first well-formed JSON object embedded in free-form text.
fn extract_json(text: &str) -> Option<Value> {
    // Try direct parse first
    if let Ok(v) = serde_json::from_str::<Value>(text) {
        return Some(v);
    }
    // Try extracting from a markdown code block
    if let Some(start) = text.find("```json") {
        let rest = &text[start + 7..];
        if let Some(end) = rest.find("```") {
            if let Ok(v) = serde_json::from_str::<Value>(rest[..end].trim()) {
                return Some(v);
            }
        }
    }
    // Try first { to last }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(v) = serde_json::from_str::<Value>(&text[start..=end]) {
                return Some(v);
            }
        }
    }
    None
}

/// Turn the model's reply into a signal. When no structured object is found,
/// fall back to keyword inference over the raw text; two independent signals
/// are required before asserting phishing.
fn interpret_reply(text: &str) -> SignalResult {
    if let Some(parsed) = extract_json(text) {
        return SignalResult {
            is_phishing: parsed["isPhishing"].as_bool() == Some(true),
            confidence: parsed["confidence"].as_f64().unwrap_or(0.0),
            source: SignalOrigin::Generative,
            details: parsed["reason"].as_str().map(|s| s.to_string()),
        };
    }

    let lower = text.to_lowercase();
    if lower.contains("phishing") && lower.contains("suspicious") {
        SignalResult {
            is_phishing: true,
            confidence: 0.5,
            source: SignalOrigin::Generative,
            details: Some("Keyword inference over unstructured reply".to_string()),
        }
    } else {
        SignalResult::benign(SignalOrigin::Generative)
    }
}

#[async_trait]
impl SignalSource for GenerativeSource {
    async fn query(&self, subject: &Subject) -> SignalOutcome {
        let prompt = Self::prompt_for(subject);
        match self.complete(&prompt).await {
            Ok(reply) => {
                let result = interpret_reply(&reply);
                debug!(
                    is_phishing = result.is_phishing,
                    confidence = result.confidence,
                    "Generative analysis completed"
                );
                Ok(result)
            }
            Err(unavailable) => {
                warn!(reason = %unavailable, "Generative source unavailable");
                Err(unavailable)
            }
        }
    }

    fn source_name(&self) -> &str {
        "generative"
    }
}
