use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A candidate artifact to classify. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Subject {
    Url { url: String },
    Text {
        content: String,
        source_url: Option<String>,
    },
    Form(FormDescriptor),
    Message { text: String, platform: String },
}

/// Shape of a scraped form as reported by the page-integration collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDescriptor {
    /// Input descriptors, e.g. "password", "email", "text:username".
    pub fields: Vec<String>,
    /// The form's submit target.
    pub action: String,
    /// Hostname of the page the form was found on.
    pub origin_domain: String,
}

/// Kind tag used for stats attribution and adapter prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Url,
    Text,
    Form,
    Message,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Text => "text",
            Self::Form => "form",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache/dedup identity for a subject: the canonicalized URL, or a digest of
/// the content for non-URL subjects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectKey(String);

impl SubjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Subject {
    pub fn url(url: impl Into<String>) -> Self {
        Subject::Url { url: url.into() }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Subject::Text { content: content.into(), source_url: None }
    }

    pub fn kind(&self) -> SubjectKind {
        match self {
            Subject::Url { .. } => SubjectKind::Url,
            Subject::Text { .. } => SubjectKind::Text,
            Subject::Form(_) => SubjectKind::Form,
            Subject::Message { .. } => SubjectKind::Message,
        }
    }

    /// Best-effort display URL for history entries and events.
    pub fn display_url(&self) -> &str {
        match self {
            Subject::Url { url } => url,
            Subject::Text { source_url, .. } => source_url.as_deref().unwrap_or(""),
            Subject::Form(form) => &form.action,
            Subject::Message { .. } => "",
        }
    }

    /// Derive the cache key. URLs canonicalize through the parser (lowercased
    /// host, fragment dropped); unparsable URLs fall back to the raw string so
    /// repeated lookups still coalesce. Content subjects hash.
    pub fn key(&self) -> SubjectKey {
        match self {
            Subject::Url { url } => match reqwest::Url::parse(url) {
                Ok(mut parsed) => {
                    parsed.set_fragment(None);
                    SubjectKey(parsed.to_string())
                }
                Err(_) => SubjectKey(url.clone()),
            },
            Subject::Text { content, .. } => SubjectKey(content_digest("text", content)),
            Subject::Form(form) => {
                let material = format!("{}|{}|{}", form.fields.join(","), form.action, form.origin_domain);
                SubjectKey(content_digest("form", &material))
            }
            Subject::Message { text, platform } => {
                SubjectKey(content_digest(platform, text))
            }
        }
    }
}

fn content_digest(tag: &str, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(tag.as_bytes());
    hasher.update(b":");
    hasher.update(content.as_bytes());
    format!("{}:{:x}", tag, hasher.finalize())
}
