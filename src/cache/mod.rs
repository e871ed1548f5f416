//! Time-bounded verdict cache. A repeated request for a subject key inside
//! the TTL window returns the stored verdict without recomputation; benign
//! verdicts are cached too, so repeats never re-trigger external calls.
//! Two decisions racing on the same key before either is stored both
//! compute; the later put wins.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::models::{SubjectKey, Verdict};

/// How long a cached verdict stays valid.
pub const TTL: Duration = Duration::from_secs(30 * 60);

/// How often the periodic sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

struct CacheEntry {
    verdict: Verdict,
    computed_at: Instant,
}

pub struct ResultCache {
    entries: DashMap<SubjectKey, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl ResultCache {
    pub fn new(max_entries: usize) -> Self {
        Self::with_ttl(TTL, max_entries)
    }

    /// TTL override for tests.
    pub fn with_ttl(ttl: Duration, max_entries: usize) -> Self {
        Self { entries: DashMap::new(), ttl, max_entries }
    }

    /// Fresh verdict for the key, if any. An entry past the TTL is evicted
    /// here rather than returned.
    pub fn get(&self, key: &SubjectKey) -> Option<Verdict> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if entry.computed_at.elapsed() < self.ttl {
                    return Some(entry.verdict.clone());
                }
                true
            }
            None => false,
        };

        if expired {
            self.entries.remove(key);
            debug!(key = %key, "Evicted expired cache entry on lookup");
        }
        None
    }

    pub fn put(&self, key: SubjectKey, verdict: Verdict) {
        // Crude backstop against unbounded growth when keys never repeat
        if self.entries.len() >= self.max_entries {
            warn!(
                entries = self.entries.len(),
                max = self.max_entries,
                "Result cache over capacity, clearing"
            );
            self.entries.clear();
        }

        self.entries.insert(key, CacheEntry { verdict, computed_at: Instant::now() });
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.computed_at.elapsed() < self.ttl);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "Swept expired cache entries");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Periodic sweep so never-requeried keys don't pin memory until lookup.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.tick().await; // first tick fires immediately
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Cache sweeper stopping");
                        return;
                    }
                    _ = interval.tick() => {
                        cache.sweep_expired();
                    }
                }
            }
        })
    }
}
