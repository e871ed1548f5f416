//! Local heuristic scorer: a fixed, explainable weighted-rule model used
//! whenever no external signal source settles a decision. Pure and
//! deterministic; same features always yield the same score.

use crate::features::{Features, FormFeatures, TextFeatures, UrlFeatures};
use crate::models::{SignalOrigin, SignalResult};

/// Ceiling for URL and form scores. Local heuristics alone never assert
/// near-certainty.
pub const URL_FORM_CEILING: f64 = 0.95;
/// Text scores cap lower; prose heuristics are noisier.
pub const TEXT_CEILING: f64 = 0.90;

/// Confidence above this makes the raw local verdict phishing (the
/// orchestrator still gates the final boolean on the active threshold).
pub const PHISHING_CUT: f64 = 0.5;

/// Fixed low confidence for structurally excluded text.
const SHORT_TEXT_CONFIDENCE: f64 = 0.1;
const SEARCH_RESULTS_CONFIDENCE: f64 = 0.05;

type Rule<F> = (fn(&F) -> bool, f64);

/// Ordered URL indicator rules. The sum is order-independent; the order is
/// fixed for reproducibility.
static URL_RULES: [Rule<UrlFeatures>; 6] = [
    (|f| f.domain_length > 20, 0.20),
    (|f| f.num_dots > 3, 0.20),
    (|f| f.num_dashes > 2, 0.20),
    (|f| !f.has_https, 0.15),
    (|f| f.has_suspicious_words, 0.30),
    (|f| f.num_special_chars > 5, 0.20),
];

static TEXT_RULES: [Rule<TextFeatures>; 2] = [
    (|f| f.capital_ratio > 0.3, 0.20),
    (|f| f.special_char_ratio > 0.1, 0.10),
];

static FORM_RULES: [Rule<FormFeatures>; 4] = [
    (|f| f.has_password, 0.25),
    (|f| f.has_login_field, 0.15),
    (|f| !f.domain_match, 0.30),
    (|f| !f.is_secure_connection, 0.30),
];

pub fn score(features: &Features) -> SignalResult {
    match features {
        Features::Url(f) => score_url(f),
        Features::Text(f) => score_text(f),
        Features::Form(f) => score_form(f),
    }
}

pub fn score_url(features: &UrlFeatures) -> SignalResult {
    clamped(sum_rules(&URL_RULES, features), URL_FORM_CEILING)
}

pub fn score_text(features: &TextFeatures) -> SignalResult {
    if features.too_short() {
        return fixed(SHORT_TEXT_CONFIDENCE);
    }
    if features.looks_like_search_results {
        return fixed(SEARCH_RESULTS_CONFIDENCE);
    }

    let score = features.indicator_weight
        + features.urgency_word_count as f64 * 0.03
        + sum_rules(&TEXT_RULES, features);
    clamped(score, TEXT_CEILING)
}

pub fn score_form(features: &FormFeatures) -> SignalResult {
    clamped(sum_rules(&FORM_RULES, features), URL_FORM_CEILING)
}

fn sum_rules<F>(rules: &[Rule<F>], features: &F) -> f64 {
    rules
        .iter()
        .filter(|(predicate, _)| predicate(features))
        .map(|(_, weight)| weight)
        .sum()
}

fn clamped(score: f64, ceiling: f64) -> SignalResult {
    let confidence = score.min(ceiling);
    SignalResult {
        is_phishing: confidence > PHISHING_CUT,
        confidence,
        source: SignalOrigin::Local,
        details: None,
    }
}

fn fixed(confidence: f64) -> SignalResult {
    SignalResult {
        is_phishing: false,
        confidence,
        source: SignalOrigin::Local,
        details: None,
    }
}
