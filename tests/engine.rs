use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use phishguard::config::{DetectionLevel, DetectorConfig};
use phishguard::engine::{BackgroundScanner, DetectionEngine, DetectionEvent};
use phishguard::models::{
    SignalOrigin, SignalOutcome, SignalResult, Subject, Unavailable,
};
use phishguard::signals::{SignalSet, SignalSource};

const PHISHY_URL: &str = "http://secure-login-verify-bankupdate.example-phish.tk/confirm";

struct MockSource {
    reply: Result<SignalResult, String>,
    calls: Arc<AtomicU32>,
}

impl MockSource {
    fn phishing(confidence: f64, source: SignalOrigin) -> (Box<dyn SignalSource>, Arc<AtomicU32>) {
        Self::with_reply(Ok(SignalResult {
            is_phishing: true,
            confidence,
            source,
            details: Some("mock detection".into()),
        }))
    }

    fn benign(source: SignalOrigin) -> (Box<dyn SignalSource>, Arc<AtomicU32>) {
        Self::with_reply(Ok(SignalResult::benign(source)))
    }

    fn unavailable() -> (Box<dyn SignalSource>, Arc<AtomicU32>) {
        Self::with_reply(Err("mock outage".into()))
    }

    fn with_reply(reply: Result<SignalResult, String>) -> (Box<dyn SignalSource>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let source = Box::new(MockSource { reply, calls: calls.clone() });
        (source, calls)
    }
}

#[async_trait]
impl SignalSource for MockSource {
    async fn query(&self, _subject: &Subject) -> SignalOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(result) => Ok(result.clone()),
            Err(reason) => Err(Unavailable::new(reason.clone())),
        }
    }

    fn source_name(&self) -> &str {
        "mock"
    }
}

fn engine_with(signals: SignalSet, level: DetectionLevel) -> DetectionEngine {
    let mut config = DetectorConfig::default();
    config.detection.level = level;
    DetectionEngine::with_sources(config, signals, None)
}

fn local_only(level: DetectionLevel) -> DetectionEngine {
    engine_with(SignalSet::local_only(), level)
}

#[tokio::test]
async fn decide_is_idempotent_within_ttl() {
    let (reputation, calls) = MockSource::benign(SignalOrigin::Reputation);
    let engine = engine_with(
        SignalSet { reputation: Some(reputation), generative: None, remote_ml: None },
        DetectionLevel::Medium,
    );

    let subject = Subject::url(PHISHY_URL);
    let first = engine.decide(&subject).await;
    let second = engine.decide(&subject).await;

    assert_eq!(first, second);
    // Only the first decision touched the adapter
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // Cache hits have no side effects on stats either
    assert_eq!(engine.current_stats().total_scanned, 1);
}

#[tokio::test]
async fn reputation_short_circuits_all_other_signals() {
    let (reputation, _) = MockSource::phishing(0.9, SignalOrigin::Reputation);
    let (generative, generative_calls) = MockSource::benign(SignalOrigin::Generative);
    let engine = engine_with(
        SignalSet { reputation: Some(reputation), generative: Some(generative), remote_ml: None },
        DetectionLevel::Medium,
    );

    let verdict = engine.decide(&Subject::url("https://example.com")).await;

    assert!(verdict.is_phishing);
    assert_eq!(verdict.source, SignalOrigin::Reputation);
    assert_eq!(verdict.confidence, 0.9);
    assert_eq!(generative_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn benign_reputation_falls_through_to_generative() {
    let (reputation, reputation_calls) = MockSource::benign(SignalOrigin::Reputation);
    let (generative, generative_calls) = MockSource::phishing(0.8, SignalOrigin::Generative);
    let engine = engine_with(
        SignalSet { reputation: Some(reputation), generative: Some(generative), remote_ml: None },
        DetectionLevel::Medium,
    );

    let verdict = engine.decide(&Subject::url("https://example.com")).await;

    assert!(verdict.is_phishing);
    assert_eq!(verdict.source, SignalOrigin::Generative);
    assert_eq!(reputation_calls.load(Ordering::SeqCst), 1);
    assert_eq!(generative_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn generative_below_threshold_falls_through_to_local() {
    // 0.6 confidence clears medium (0.5) but not low (0.7)
    let (generative, _) = MockSource::phishing(0.6, SignalOrigin::Generative);
    let engine = engine_with(
        SignalSet { reputation: None, generative: Some(generative), remote_ml: None },
        DetectionLevel::Low,
    );

    let verdict = engine.decide(&Subject::url("https://example.com/about")).await;

    // Fell through to the local scorer, which finds nothing at this URL
    assert!(!verdict.is_phishing);
    assert_eq!(verdict.source, SignalOrigin::Local);
}

#[tokio::test]
async fn unavailable_adapters_degrade_to_local_scorer() {
    let (reputation, reputation_calls) = MockSource::unavailable();
    let (generative, generative_calls) = MockSource::unavailable();
    let engine = engine_with(
        SignalSet { reputation: Some(reputation), generative: Some(generative), remote_ml: None },
        DetectionLevel::Medium,
    );

    let verdict = engine.decide(&Subject::url(PHISHY_URL)).await;

    assert!(verdict.is_phishing);
    assert_eq!(verdict.source, SignalOrigin::Local);
    assert_eq!(reputation_calls.load(Ordering::SeqCst), 1);
    assert_eq!(generative_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn remote_ml_result_replaces_local_scorer() {
    let (remote_ml, ml_calls) = MockSource::phishing(0.85, SignalOrigin::Ml);
    let engine = engine_with(
        SignalSet { reputation: None, generative: None, remote_ml: Some(remote_ml) },
        DetectionLevel::Medium,
    );

    let verdict = engine.decide(&Subject::url("https://example.com/about")).await;

    assert!(verdict.is_phishing);
    assert_eq!(verdict.source, SignalOrigin::Ml);
    assert_eq!(ml_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn phishy_url_detected_locally_with_no_adapters() {
    let engine = local_only(DetectionLevel::Medium);
    let verdict = engine.decide(&Subject::url(PHISHY_URL)).await;

    // no https + suspicious keywords + >2 dashes (+ long domain)
    assert!(verdict.is_phishing);
    assert!(verdict.confidence >= 0.65);
    assert!(verdict.confidence <= 0.95);
    assert_eq!(verdict.source, SignalOrigin::Local);
    assert_eq!(verdict.threshold_applied, 0.5);

    let stats = engine.current_stats();
    assert_eq!(stats.total_scanned, 1);
    assert_eq!(stats.phishing_detected, 1);
    assert!(stats.last_detection_at.is_some());
}

#[tokio::test]
async fn threshold_monotonicity_across_levels() {
    // Long domain (0.2) + no https (0.15) = local confidence 0.35
    let url = "http://averylongdomainnamehere123.com/";

    let high = local_only(DetectionLevel::High);
    let verdict = high.decide(&Subject::url(url)).await;
    assert!((verdict.confidence - 0.35).abs() < 1e-9);
    assert!(verdict.is_phishing); // 0.35 > 0.3

    let medium = local_only(DetectionLevel::Medium);
    assert!(!medium.decide(&Subject::url(url)).await.is_phishing);

    let low = local_only(DetectionLevel::Low);
    assert!(!low.decide(&Subject::url(url)).await.is_phishing);
}

#[tokio::test]
async fn runtime_level_change_applies_to_next_decision() {
    let engine = local_only(DetectionLevel::Medium);

    // Long domain (0.2) + no https (0.15) = confidence 0.35
    let first = engine.decide(&Subject::url("http://averylongdomainnamehere123.com/")).await;
    assert!(!first.is_phishing);
    assert_eq!(first.threshold_applied, 0.5);

    engine.set_detection_level(DetectionLevel::High);
    assert_eq!(engine.detection_level(), DetectionLevel::High);

    // Fresh subject so the first verdict's cache entry is not consulted
    let second = engine.decide(&Subject::url("http://anotherverylongdomainname45.com/")).await;
    assert!(second.is_phishing);
    assert_eq!(second.threshold_applied, 0.3);
}

#[tokio::test]
async fn short_text_short_circuits() {
    let engine = local_only(DetectionLevel::Medium);
    let content = "Win a prize! Click here to claim your reward before the offer expires.";
    assert!(content.len() < 200);
    let verdict = engine.decide(&Subject::text(content)).await;

    assert!(!verdict.is_phishing);
    assert_eq!(verdict.confidence, 0.1);
    assert_eq!(verdict.source, SignalOrigin::Local);
}

#[tokio::test]
async fn content_blend_mixes_local_and_generative() {
    // unusual activity (0.20) + account suspended (0.25) = local 0.45,
    // above the 0.4 blend bar but below the medium threshold on its own
    let content = "We have noticed some unusual activity related to your profile and as a \
                   result your account suspended status will remain in effect until the review \
                   completes. Our team will share the outcome of the review with you once the \
                   process finishes and normal service resumes for your profile here.";
    assert!(content.len() >= 200);

    let (generative, generative_calls) = MockSource::phishing(0.9, SignalOrigin::Generative);
    let engine = engine_with(
        SignalSet { reputation: None, generative: Some(generative), remote_ml: None },
        DetectionLevel::Medium,
    );

    let verdict = engine.decide(&Subject::text(content)).await;

    // 0.45 * 0.6 + 0.9 * 0.4 = 0.63
    assert!(verdict.is_phishing);
    assert!((verdict.confidence - 0.63).abs() < 1e-9);
    assert_eq!(verdict.source, SignalOrigin::Generative);
    assert_eq!(generative_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn content_below_blend_bar_skips_generative() {
    let content = "This is a perfectly ordinary paragraph about gardening that goes on for a \
                   while describing soil, compost, seeds, watering schedules and the pleasant \
                   routine of tending to a vegetable patch across the seasons of a mild and \
                   rainy climate in the north of the country.";
    assert!(content.len() >= 200);

    let (generative, generative_calls) = MockSource::phishing(0.9, SignalOrigin::Generative);
    let engine = engine_with(
        SignalSet { reputation: None, generative: Some(generative), remote_ml: None },
        DetectionLevel::Medium,
    );

    let verdict = engine.decide(&Subject::text(content)).await;

    assert!(!verdict.is_phishing);
    assert_eq!(generative_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unparsable_url_degrades_to_error_verdict() {
    let engine = local_only(DetectionLevel::Medium);
    let verdict = engine.decide(&Subject::url("::::")).await;

    assert!(!verdict.is_phishing);
    assert_eq!(verdict.confidence, 0.0);
    assert_eq!(verdict.source, SignalOrigin::Error);
}

#[tokio::test(start_paused = true)]
async fn queue_coalesces_same_handle() {
    let engine = Arc::new(local_only(DetectionLevel::Medium));
    let mut events = engine.subscribe();
    let scanner = BackgroundScanner::new(engine.clone());

    // Two enqueues for one handle before the worker runs: the second wins
    scanner.enqueue(7, Subject::url("https://first.example.com"));
    scanner.enqueue(7, Subject::url("https://second.example.com"));
    assert_eq!(scanner.pending_len(), 1);

    scanner.drained().await;
    scanner.shutdown().await;

    let mut verdicts = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let DetectionEvent::VerdictReady { handle, url, .. } = event {
            verdicts.push((handle, url));
        }
    }

    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].0, 7);
    assert!(verdicts[0].1.contains("second.example.com"));
    assert_eq!(engine.current_stats().total_scanned, 1);
}

#[tokio::test(start_paused = true)]
async fn queue_processes_distinct_handles_sequentially() {
    let engine = Arc::new(local_only(DetectionLevel::Medium));
    let mut events = engine.subscribe();
    let scanner = BackgroundScanner::new(engine.clone());

    scanner.enqueue(1, Subject::url("https://a.example.com"));
    scanner.enqueue(2, Subject::url("https://b.example.com"));
    scanner.enqueue(3, Subject::url("https://c.example.com"));

    scanner.drained().await;
    scanner.shutdown().await;

    let mut handles = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let DetectionEvent::VerdictReady { handle, .. } = event {
            handles.push(handle);
        }
    }

    assert_eq!(handles, vec![1, 2, 3]);
    assert_eq!(engine.current_stats().total_scanned, 3);
}

#[tokio::test]
async fn disabled_background_scanning_drops_enqueues() {
    let engine = Arc::new(local_only(DetectionLevel::Medium));
    engine.set_background_scan_enabled(false);
    let scanner = BackgroundScanner::new(engine.clone());

    scanner.enqueue(1, Subject::url("https://example.com"));
    assert_eq!(scanner.pending_len(), 0);

    scanner.drained().await;
    scanner.shutdown().await;
    assert_eq!(engine.current_stats().total_scanned, 0);
}

#[tokio::test]
async fn stats_updated_event_fires_on_decisions() {
    let engine = local_only(DetectionLevel::Medium);
    let mut events = engine.subscribe();

    engine.decide(&Subject::url("https://example.com")).await;

    match events.try_recv() {
        Ok(DetectionEvent::StatsUpdated { stats }) => {
            assert_eq!(stats.total_scanned, 1);
        }
        other => panic!("expected StatsUpdated, got {:?}", other),
    }
}

#[tokio::test]
async fn api_availability_reflects_configured_sources() {
    let (generative, _) = MockSource::benign(SignalOrigin::Generative);
    let engine = engine_with(
        SignalSet { reputation: None, generative: Some(generative), remote_ml: None },
        DetectionLevel::Medium,
    );

    let availability = engine.api_availability();
    assert!(!availability.reputation);
    assert!(availability.generative);
    assert!(!availability.remote_ml);
}
