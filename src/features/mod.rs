pub mod form;
pub mod text;
pub mod url;

pub use form::{extract_form_features, FormFeatures};
pub use text::{extract_text_features, TextFeatures};
pub use url::{extract_url_features, UrlFeatures};

use serde::{Deserialize, Serialize};

use crate::models::Subject;

/// Feature record for one subject, shaped by its tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Features {
    Url(UrlFeatures),
    Text(TextFeatures),
    Form(FormFeatures),
}

/// Derive features from a subject. Total: malformed input yields a zeroed
/// record rather than an error, so the caller always has a fallback score.
/// Message snippets go through the text path.
pub fn extract(subject: &Subject) -> Features {
    match subject {
        Subject::Url { url } => Features::Url(extract_url_features(url)),
        Subject::Text { content, .. } => Features::Text(extract_text_features(content)),
        Subject::Form(form) => Features::Form(extract_form_features(form)),
        Subject::Message { text, .. } => Features::Text(extract_text_features(text)),
    }
}
