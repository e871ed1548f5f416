use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Fixed-shape feature record for a URL subject. A zeroed record (the
/// `Default`) stands in for anything the parser rejects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlFeatures {
    pub domain_length: usize,
    pub path_length: usize,
    pub num_dots: usize,
    pub num_dashes: usize,
    pub has_https: bool,
    pub query_length: usize,
    pub has_suspicious_words: bool,
    pub num_special_chars: usize,
}

static SUSPICIOUS_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"login|account|secure|verify|bank|update|confirm").unwrap());

static SPECIAL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9-.]").unwrap());

pub fn extract_url_features(url: &str) -> UrlFeatures {
    let parsed = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return UrlFeatures::default(),
    };

    let host = parsed.host_str().unwrap_or("");
    let lower = url.to_lowercase();

    UrlFeatures {
        domain_length: host.len(),
        path_length: parsed.path().len(),
        num_dots: host.matches('.').count(),
        num_dashes: host.matches('-').count(),
        has_https: parsed.scheme() == "https",
        query_length: parsed.query().map(str::len).unwrap_or(0),
        has_suspicious_words: SUSPICIOUS_WORDS.is_match(&lower),
        num_special_chars: SPECIAL_CHARS.find_iter(url).count(),
    }
}
