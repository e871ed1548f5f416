use serde::{Deserialize, Serialize};

use crate::models::FormDescriptor;

/// Fixed-shape feature record for a form subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormFeatures {
    pub has_password: bool,
    pub has_login_field: bool,
    pub domain_match: bool,
    pub is_secure_connection: bool,
}

pub fn extract_form_features(form: &FormDescriptor) -> FormFeatures {
    let has_password = form.fields.iter().any(|f| f.to_lowercase().contains("password"));
    let has_login_field = form.fields.iter().any(|f| {
        let lower = f.to_lowercase();
        lower.contains("login") || lower.contains("email") || lower.contains("user")
    });

    // An unparsable action target counts as a mismatch, not an error
    let domain_match = reqwest::Url::parse(&form.action)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case(&form.origin_domain)))
        .unwrap_or(false);

    FormFeatures {
        has_password,
        has_login_field,
        domain_match,
        is_secure_connection: form.action.starts_with("https"),
    }
}
