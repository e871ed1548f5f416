use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::events::DetectionEvent;
use crate::cache::ResultCache;
use crate::config::{DetectionConfig, DetectionLevel, DetectorConfig};
use crate::features;
use crate::models::{SignalOrigin, SignalResult, Subject, Verdict};
use crate::scorer;
use crate::signals::{ApiAvailability, SignalSet};
use crate::stats::{DetectionStats, StatsAggregator, StatsStore};

/// Local-score bar above which non-URL content is cross-checked against the
/// generative source instead of decided locally alone.
const BLEND_BAR: f64 = 0.4;
const BLEND_LOCAL_WEIGHT: f64 = 0.6;
const BLEND_GENERATIVE_WEIGHT: f64 = 0.4;

/// The decision engine. Sequences signal sources in fixed precedence,
/// applies the active threshold, and owns all cache and stats mutation.
///
/// The public contract is total: `decide` always returns a verdict, because
/// the calling UI must always have something to render.
pub struct DetectionEngine {
    detection: RwLock<DetectionConfig>,
    signals: SignalSet,
    cache: Arc<ResultCache>,
    stats: Arc<StatsAggregator>,
    event_tx: RwLock<Option<mpsc::UnboundedSender<DetectionEvent>>>,
}

impl DetectionEngine {
    pub fn new(config: DetectorConfig, store: Option<Arc<dyn StatsStore>>) -> Self {
        let signals = SignalSet::from_config(&config.signals);
        Self::with_sources(config, signals, store)
    }

    /// Construct with pre-built sources. Tests inject mocks here.
    pub fn with_sources(
        config: DetectorConfig,
        signals: SignalSet,
        store: Option<Arc<dyn StatsStore>>,
    ) -> Self {
        Self {
            detection: RwLock::new(config.detection),
            signals,
            cache: Arc::new(ResultCache::new(config.cache.max_entries)),
            stats: Arc::new(StatsAggregator::new(store)),
            event_tx: RwLock::new(None),
        }
    }

    /// Subscribe the UI collaborator. Returns the receiving end.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<DetectionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.event_tx.write().unwrap() = Some(tx);
        rx
    }

    pub(crate) fn emit(&self, event: DetectionEvent) {
        if let Some(tx) = self.event_tx.read().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn stats_aggregator(&self) -> &Arc<StatsAggregator> {
        &self.stats
    }

    pub fn current_stats(&self) -> DetectionStats {
        self.stats.snapshot()
    }

    pub fn api_availability(&self) -> ApiAvailability {
        self.signals.availability()
    }

    pub fn detection_level(&self) -> DetectionLevel {
        self.detection.read().unwrap().level
    }

    pub fn set_detection_level(&self, level: DetectionLevel) {
        info!(level = %level, "Detection level changed");
        self.detection.write().unwrap().level = level;
    }

    pub fn scan_enabled(&self) -> bool {
        self.detection.read().unwrap().scan_enabled
    }

    pub fn set_scan_enabled(&self, enabled: bool) {
        info!(enabled, "Scanning toggled");
        self.detection.write().unwrap().scan_enabled = enabled;
    }

    pub fn background_scan_enabled(&self) -> bool {
        self.detection.read().unwrap().background_scan_enabled
    }

    pub fn set_background_scan_enabled(&self, enabled: bool) {
        info!(enabled, "Background scanning toggled");
        self.detection.write().unwrap().background_scan_enabled = enabled;
    }

    pub fn notifications_enabled(&self) -> bool {
        self.detection.read().unwrap().notifications_enabled
    }

    /// Log a message threat reported from outside the decision path.
    pub fn record_message_threat(&self, threat_type: &str, platform: &str, url: &str) {
        let stats = self.stats.record_message_threat(threat_type, platform, url);
        self.emit(DetectionEvent::StatsUpdated { stats });
    }

    /// Decide whether a subject is phishing.
    ///
    /// A fresh cached verdict is returned verbatim with no recomputation and
    /// no side effects. Otherwise the signal sources run in precedence
    /// order, the outcome is cached unconditionally (benign verdicts too),
    /// and the stats aggregator records it.
    pub async fn decide(&self, subject: &Subject) -> Verdict {
        let key = subject.key();
        if let Some(cached) = self.cache.get(&key) {
            debug!(key = %key, "Returning cached verdict");
            return cached;
        }

        // Read once per decision; a concurrent level change applies to the
        // next decision, never retroactively.
        let threshold = self.detection_level().threshold();

        let verdict = match subject {
            Subject::Url { .. } => self.decide_url(subject, threshold).await,
            _ => self.decide_content(subject, threshold).await,
        };

        self.cache.put(key, verdict.clone());

        let stats = self.stats.record_scan(subject, &verdict);
        self.emit(DetectionEvent::StatsUpdated { stats });

        if verdict.is_phishing {
            info!(
                url = subject.display_url(),
                confidence = verdict.confidence,
                source = %verdict.source,
                "Phishing detected"
            );
        }
        verdict
    }

    /// URL precedence: reputation short-circuits, then generative gated by
    /// threshold, then the ML/local fallback.
    async fn decide_url(&self, subject: &Subject, threshold: f64) -> Verdict {
        if let Some(reputation) = &self.signals.reputation {
            match reputation.query(subject).await {
                Ok(result) if result.is_phishing => {
                    // Reputation is authoritative; no further signals run
                    debug!(confidence = result.confidence, "Reputation short-circuit");
                    return Verdict::from_signal(result, threshold);
                }
                Ok(_) => {}
                Err(unavailable) => {
                    debug!(reason = %unavailable, "Skipping reputation signal");
                }
            }
        }

        if let Some(generative) = &self.signals.generative {
            match generative.query(subject).await {
                Ok(result) if result.is_phishing && result.confidence > threshold => {
                    return Verdict::from_signal(result, threshold);
                }
                Ok(_) => {}
                Err(unavailable) => {
                    debug!(reason = %unavailable, "Skipping generative signal");
                }
            }
        }

        let result = self.ml_or_local(subject).await;
        Verdict::from_signal(gate(result, threshold), threshold)
    }

    /// Content precedence: ML/local score first; a score above the blend bar
    /// is cross-checked against the generative source and mixed with fixed
    /// weights. The asymmetry with the URL path is deliberate product
    /// behavior, kept as-is.
    async fn decide_content(&self, subject: &Subject, threshold: f64) -> Verdict {
        let local = self.ml_or_local(subject).await;

        let blended = if local.confidence > BLEND_BAR {
            if let Some(generative) = &self.signals.generative {
                match generative.query(subject).await {
                    Ok(remote) => {
                        let confidence = local.confidence * BLEND_LOCAL_WEIGHT
                            + remote.confidence * BLEND_GENERATIVE_WEIGHT;
                        Some(SignalResult {
                            is_phishing: confidence > threshold,
                            confidence,
                            source: SignalOrigin::Generative,
                            details: remote.details.or(local.details.clone()),
                        })
                    }
                    Err(unavailable) => {
                        debug!(reason = %unavailable, "Blend skipped, generative unavailable");
                        None
                    }
                }
            } else {
                None
            }
        } else {
            None
        };

        Verdict::from_signal(gate(blended.unwrap_or(local), threshold), threshold)
    }

    /// Step-5 fallback chain: remote ML when configured, else the local
    /// heuristic scorer. Never fails; a structurally invalid URL yields the
    /// zero-confidence error result.
    async fn ml_or_local(&self, subject: &Subject) -> SignalResult {
        if let Some(remote_ml) = &self.signals.remote_ml {
            match remote_ml.query(subject).await {
                Ok(result) => return result,
                Err(unavailable) => {
                    debug!(reason = %unavailable, "Remote ML unavailable, scoring locally");
                }
            }
        }
        local_result(subject)
    }
}

/// The active threshold decides the final boolean for gated paths; the
/// numeric confidence is retained for display either way. A high sensitivity
/// level can therefore flag a score the source itself called benign.
fn gate(mut result: SignalResult, threshold: f64) -> SignalResult {
    result.is_phishing = result.confidence > threshold;
    result
}

/// Local heuristic result for a subject. URL subjects that fail to parse
/// cannot be scored at all and degrade to the error-tagged zero result.
fn local_result(subject: &Subject) -> SignalResult {
    if let Subject::Url { url } = subject {
        if reqwest::Url::parse(url).is_err() {
            warn!(url = %url, "Subject URL unparsable, degrading");
            return SignalResult {
                is_phishing: false,
                confidence: 0.0,
                source: SignalOrigin::Error,
                details: None,
            };
        }
    }
    scorer::score(&features::extract(subject))
}
