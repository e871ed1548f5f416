use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Fixed-shape feature record for a text subject.
///
/// `indicator_weight` and `urgency_word_count` stay zero when a structural
/// exclusion (`too_short` / `looks_like_search_results`) applies: the scorer
/// short-circuits before they matter, so the pattern battery is never run
/// for non-prose content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFeatures {
    pub length: usize,
    pub word_count: usize,
    pub capital_ratio: f64,
    pub special_char_ratio: f64,
    pub looks_like_search_results: bool,
    pub urgency_word_count: usize,
    pub indicator_weight: f64,
}

impl TextFeatures {
    pub fn too_short(&self) -> bool {
        self.length < 200 || self.word_count < 30
    }
}

fn ci(pattern: &str) -> Regex {
    RegexBuilder::new(pattern).case_insensitive(true).build().unwrap()
}

/// Non-prose page shapes that must never be scored as phishing content.
static SEARCH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"search results for",
        r"results for",
        r"sponsored",
        r"advertisement",
        r"\d+ results",
        r"people also ask",
        r"related searches",
    ]
    .iter()
    .map(|p| ci(p))
    .collect()
});

/// Ordered phishing-indicator battery. Weights are fixed product constants;
/// the sum is order-independent but the order is kept stable for
/// reproducibility.
static INDICATOR_PATTERNS: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    [
        (r"verify.*account|account.*verify", 0.12),
        (r"confirm.*identity|identity.*confirm", 0.15),
        (r"update.*payment|payment.*update", 0.18),
        (r"unusual.*activity|suspicious.*activity", 0.20),
        (r"limited.*access|account.*suspended", 0.25),
        (r"password.*expired|reset.*password.*now", 0.15),
        (r"security.*alert|urgent.*action", 0.17),
        (r"(enter|verify|confirm|validate).*card details", 0.30),
        (r"click.*here.*login", 0.10),
        (r"account.*terminated|reactivate.*account", 0.22),
        (r"bank.*transfer|wire.*transfer", 0.14),
        (r"(100|1000)%.*guarantee", 0.08),
        (r"limited.*time.*offer", 0.07),
        (r"(won|winner|winning|lottery|prize).*(million|billion)", 0.35),
        (r"dear.*customer", 0.10),
        (r"final.*warning|last.*notice", 0.20),
    ]
    .iter()
    .map(|(p, w)| (ci(p), *w))
    .collect()
});

static URGENCY_WORDS: Lazy<Regex> = Lazy::new(|| {
    ci(r"\b(urgent|immediately|alert|warning|attention|important|now|critical)\b")
});

static DO_NOT_IGNORE: Lazy<Regex> = Lazy::new(|| ci(r"please do not (ignore|delay)"));

// The courtesy-letter frame of a scam mail: a formal greeting, a thank-you,
// and a sign-off all present in one text.
static COURTESY_FRAME: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        ci(r"dear (valued|customer|user)"),
        ci(r"thank you for your"),
        ci(r"sincerely|regards|team"),
    ]
});

pub fn extract_text_features(text: &str) -> TextFeatures {
    let mut features = TextFeatures {
        length: text.len(),
        word_count: text.split_whitespace().count(),
        capital_ratio: capital_ratio(text),
        special_char_ratio: special_char_ratio(text),
        ..TextFeatures::default()
    };

    if features.too_short() {
        return features;
    }

    let lower = text.to_lowercase();
    if SEARCH_PATTERNS.iter().any(|p| p.is_match(&lower)) {
        features.looks_like_search_results = true;
        return features;
    }

    let mut weight = 0.0;
    for (pattern, w) in INDICATOR_PATTERNS.iter() {
        if pattern.is_match(&lower) {
            weight += w;
        }
    }
    if DO_NOT_IGNORE.is_match(&lower) {
        weight += 0.10;
    }
    if COURTESY_FRAME.iter().all(|p| p.is_match(&lower)) {
        weight += 0.25;
    }

    features.indicator_weight = weight;
    features.urgency_word_count = URGENCY_WORDS.find_iter(&lower).count();
    features
}

fn capital_ratio(text: &str) -> f64 {
    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    if letters == 0 {
        return 0.0;
    }
    let capitals = text.chars().filter(|c| c.is_uppercase()).count();
    capitals as f64 / letters as f64
}

fn special_char_ratio(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let specials = text
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
        .count();
    specials as f64 / text.chars().count() as f64
}
