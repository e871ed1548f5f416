use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::build_engine;
use super::check::print_verdict;
use super::commands::WatchArgs;
use crate::engine::{BackgroundScanner, DetectionEvent};
use crate::errors::PhishGuardError;
use crate::models::Subject;

/// Feed stdin URLs through the background scan queue, one line per subject.
/// Each line gets its own handle, so repeats of the same line position
/// coalesce the way repeated loads of one tab would.
pub async fn handle_watch(args: WatchArgs) -> Result<(), PhishGuardError> {
    let engine = build_engine(&args.common).await?;
    let mut events = engine.subscribe();
    let scanner = BackgroundScanner::new(engine.clone());

    let sweeper_cancel = CancellationToken::new();
    let sweeper = engine.cache().spawn_sweeper(sweeper_cancel.clone());

    let printer_engine = engine.clone();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let DetectionEvent::VerdictReady { url, verdict, .. } = event {
                if printer_engine.notifications_enabled() {
                    print_verdict(&url, &verdict);
                }
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut handle = 0u64;
    while let Some(line) = lines.next_line().await? {
        let url = line.trim().to_string();
        if url.is_empty() {
            continue;
        }
        scanner.enqueue(handle, Subject::url(url));
        handle += 1;
    }

    scanner.drained().await;
    scanner.shutdown().await;
    sweeper_cancel.cancel();
    let _ = sweeper.await;
    printer.abort();

    let stats = engine.current_stats();
    info!(
        total_scanned = stats.total_scanned,
        phishing_detected = stats.phishing_detected,
        "Watch session finished"
    );
    Ok(())
}
