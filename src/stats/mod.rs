//! Rolling detection statistics: process-wide counters, a capped detection
//! history, and a trailing 7-day histogram. All mutation happens behind one
//! mutex; writers are the orchestrator and the message-threat log only.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::PhishGuardError;
use crate::models::{Subject, Verdict};

/// History keeps this many entries; oldest drop first.
pub const HISTORY_CAP: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionStats {
    pub total_scanned: u64,
    pub phishing_detected: u64,
    pub last_detection_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub subject_type: String,
    pub confidence: f64,
    pub action: String,
    pub threat_type: Option<String>,
    pub platform: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub label: String,
    pub scans: u64,
    pub detections: u64,
}

/// Ordered 7-entry histogram covering the trailing calendar week, oldest
/// first. The aggregator only ever increments "today"; rolling the window
/// forward at day boundaries belongs to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyHistogram {
    pub days: Vec<DayBucket>,
}

pub fn day_label(date: DateTime<Utc>) -> String {
    date.format("%b %-d").to_string()
}

impl WeeklyHistogram {
    pub fn trailing_week(today: DateTime<Utc>) -> Self {
        let days = (0..7)
            .rev()
            .map(|offset| DayBucket {
                label: day_label(today - ChronoDuration::days(offset)),
                scans: 0,
                detections: 0,
            })
            .collect();
        Self { days }
    }

    /// Roll the window so it ends at `today`, shifting off stale buckets and
    /// appending empty ones. Counts for days still inside the window survive.
    pub fn rolled_forward_to(&self, today: DateTime<Utc>) -> Self {
        let mut rolled = Self::trailing_week(today);
        for bucket in &mut rolled.days {
            if let Some(existing) = self.days.iter().find(|d| d.label == bucket.label) {
                bucket.scans = existing.scans;
                bucket.detections = existing.detections;
            }
        }
        rolled
    }

    fn today_mut(&mut self, now: DateTime<Utc>) -> Option<&mut DayBucket> {
        let label = day_label(now);
        self.days.iter_mut().find(|d| d.label == label)
    }
}

/// Persistence boundary. Implementations must tolerate being called once per
/// decision; failures are logged by the aggregator and never fail a scan.
pub trait StatsStore: Send + Sync {
    fn persist(
        &self,
        stats: &DetectionStats,
        new_entry: Option<&HistoryEntry>,
        weekly: &WeeklyHistogram,
    ) -> Result<(), PhishGuardError>;
}

struct Inner {
    stats: DetectionStats,
    history: VecDeque<HistoryEntry>,
    weekly: WeeklyHistogram,
}

pub struct StatsAggregator {
    inner: Mutex<Inner>,
    store: Option<Arc<dyn StatsStore>>,
}

impl StatsAggregator {
    pub fn new(store: Option<Arc<dyn StatsStore>>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                stats: DetectionStats::default(),
                history: VecDeque::new(),
                weekly: WeeklyHistogram::trailing_week(Utc::now()),
            }),
            store,
        }
    }

    /// Seed from persisted state (already rolled forward by the store).
    pub fn restore(
        &self,
        stats: DetectionStats,
        history: Vec<HistoryEntry>,
        weekly: WeeklyHistogram,
    ) {
        let mut inner = self.inner.lock().unwrap();
        inner.stats = stats;
        inner.history = history.into();
        inner.weekly = weekly;
    }

    /// Record one decision outcome. Total always increments; detection
    /// counters and a history record only when the verdict says phishing.
    /// Returns the post-update snapshot.
    pub fn record_scan(&self, subject: &Subject, verdict: &Verdict) -> DetectionStats {
        let now = Utc::now();
        let mut inner = self.inner.lock().unwrap();

        inner.stats.total_scanned += 1;
        if let Some(today) = inner.weekly.today_mut(now) {
            today.scans += 1;
        }

        let mut new_entry = None;
        if verdict.is_phishing {
            inner.stats.phishing_detected += 1;
            inner.stats.last_detection_at = Some(now);
            if let Some(today) = inner.weekly.today_mut(now) {
                today.detections += 1;
            }

            let entry = HistoryEntry {
                timestamp: now,
                url: subject.display_url().to_string(),
                subject_type: subject.kind().as_str().to_string(),
                confidence: verdict.confidence,
                action: "Detected".to_string(),
                threat_type: None,
                platform: match subject {
                    Subject::Message { platform, .. } => Some(platform.clone()),
                    _ => None,
                },
            };
            push_capped(&mut inner.history, entry.clone());
            new_entry = Some(entry);
        }

        self.persist(&inner, new_entry.as_ref());
        inner.stats.clone()
    }

    /// Record a message threat reported by the page-integration collaborator.
    /// Bumps the detection counter and history without a scan having run.
    pub fn record_message_threat(
        &self,
        threat_type: &str,
        platform: &str,
        url: &str,
    ) -> DetectionStats {
        let now = Utc::now();
        let mut inner = self.inner.lock().unwrap();

        inner.stats.phishing_detected += 1;
        inner.stats.last_detection_at = Some(now);

        let entry = HistoryEntry {
            timestamp: now,
            url: url.to_string(),
            subject_type: "message".to_string(),
            confidence: 0.0,
            action: "Detected".to_string(),
            threat_type: Some(threat_type.to_string()),
            platform: Some(platform.to_string()),
        };
        push_capped(&mut inner.history, entry.clone());

        self.persist(&inner, Some(&entry));
        inner.stats.clone()
    }

    pub fn snapshot(&self) -> DetectionStats {
        self.inner.lock().unwrap().stats.clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.inner.lock().unwrap().history.iter().cloned().collect()
    }

    pub fn weekly(&self) -> WeeklyHistogram {
        self.inner.lock().unwrap().weekly.clone()
    }

    fn persist(&self, inner: &Inner, new_entry: Option<&HistoryEntry>) {
        if let Some(store) = &self.store {
            if let Err(e) = store.persist(&inner.stats, new_entry, &inner.weekly) {
                warn!(error = %e, "Failed to persist detection stats");
            }
        }
    }
}

fn push_capped(history: &mut VecDeque<HistoryEntry>, entry: HistoryEntry) {
    history.push_back(entry);
    while history.len() > HISTORY_CAP {
        history.pop_front();
    }
}
