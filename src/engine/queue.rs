use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::events::{DetectionEvent, ScanHandle};
use super::orchestrator::DetectionEngine;
use crate::models::Subject;

/// Pause between queue items so a burst of page loads doesn't monopolize the
/// worker.
const BACKOFF_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Draining,
}

pub struct ScanQueueItem {
    pub handle: ScanHandle,
    pub subject: Subject,
    pub enqueued_at: Instant,
}

struct QueueState {
    pending: Vec<ScanQueueItem>,
    worker: WorkerState,
}

struct QueueInner {
    state: Mutex<QueueState>,
    wakeup: Notify,
    engine: Arc<DetectionEngine>,
}

/// Single-concurrency worker that drains passive scan requests through the
/// orchestrator. At most one decision is in flight from this queue at any
/// time; repeated requests for the same handle coalesce to the latest.
pub struct BackgroundScanner {
    inner: Arc<QueueInner>,
    cancel: CancellationToken,
    worker: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl BackgroundScanner {
    pub fn new(engine: Arc<DetectionEngine>) -> Self {
        let inner = Arc::new(QueueInner {
            state: Mutex::new(QueueState { pending: Vec::new(), worker: WorkerState::Idle }),
            wakeup: Notify::new(),
            engine,
        });
        let cancel = CancellationToken::new();

        let worker = tokio::spawn(run_worker(Arc::clone(&inner), cancel.clone()));

        Self { inner, cancel, worker: Mutex::new(Some(worker)) }
    }

    /// Queue a subject for passive scanning. A pending item for the same
    /// handle is replaced, never duplicated; the latest subject wins. Items
    /// are dropped outright while background scanning is disabled.
    pub fn enqueue(&self, handle: ScanHandle, subject: Subject) {
        if !self.inner.engine.background_scan_enabled() {
            debug!(handle, "Background scanning disabled, dropping scan request");
            return;
        }

        let item = ScanQueueItem { handle, subject, enqueued_at: Instant::now() };
        {
            let mut state = self.inner.state.lock().unwrap();
            match state.pending.iter_mut().find(|i| i.handle == handle) {
                Some(existing) => {
                    debug!(handle, "Coalescing scan request");
                    *existing = item;
                }
                None => state.pending.push(item),
            }
        }
        self.inner.wakeup.notify_one();
    }

    pub fn worker_state(&self) -> WorkerState {
        self.inner.state.lock().unwrap().worker
    }

    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().unwrap().pending.len()
    }

    /// Wait until every queued item has been processed.
    pub async fn drained(&self) {
        loop {
            {
                let state = self.inner.state.lock().unwrap();
                if state.pending.is_empty() && state.worker == WorkerState::Idle {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = self.worker.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

async fn run_worker(inner: Arc<QueueInner>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Background scan worker stopping");
                return;
            }
            _ = inner.wakeup.notified() => {}
        }

        loop {
            let item = {
                let mut state = inner.state.lock().unwrap();
                if state.pending.is_empty() {
                    state.worker = WorkerState::Idle;
                    break;
                }
                state.worker = WorkerState::Draining;
                state.pending.remove(0)
            };

            debug!(
                handle = item.handle,
                queued_ms = item.enqueued_at.elapsed().as_millis() as u64,
                "Processing background scan"
            );

            // Once started, a decision always runs to completion or
            // adapter-level timeout; superseded items were dropped above.
            let verdict = inner.engine.decide(&item.subject).await;
            inner.engine.emit(DetectionEvent::VerdictReady {
                handle: item.handle,
                url: item.subject.display_url().to_string(),
                verdict,
            });

            let more_pending = !inner.state.lock().unwrap().pending.is_empty();
            if more_pending {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(BACKOFF_DELAY) => {}
                }
            }
        }
    }
}
