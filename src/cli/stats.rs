use console::style;

use super::commands::StatsArgs;
use crate::db::Database;
use crate::errors::PhishGuardError;

pub async fn handle_stats(args: StatsArgs) -> Result<(), PhishGuardError> {
    let db = Database::new(&args.db)?;
    let stats = db.load_stats()?;
    let weekly = db.load_weekly(chrono::Utc::now())?;
    let history = db.load_history()?;

    println!("{}", style("Detection statistics").bold());
    println!("  total scanned:     {}", stats.total_scanned);
    println!("  phishing detected: {}", stats.phishing_detected);
    match stats.last_detection_at {
        Some(at) => println!("  last detection:    {}", at.to_rfc3339()),
        None => println!("  last detection:    never"),
    }

    println!("\n{}", style("Trailing 7 days").bold());
    for day in &weekly.days {
        println!("  {:>8}  scans {:>5}  detections {:>5}", day.label, day.scans, day.detections);
    }

    if !history.is_empty() {
        println!("\n{}", style("Recent detections").bold());
        for entry in history.iter().rev().take(10) {
            println!(
                "  {}  [{}] {:.2}  {}",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.subject_type,
                entry.confidence,
                entry.url
            );
        }
    }

    Ok(())
}
