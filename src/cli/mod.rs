pub mod check;
pub mod commands;
pub mod stats;
pub mod watch;

pub use commands::{Cli, Commands};

use std::path::Path;
use std::sync::Arc;

use crate::config::{parse_config, DetectorConfig};
use crate::db::Database;
use crate::engine::DetectionEngine;
use crate::errors::PhishGuardError;
use crate::stats::StatsStore;

use self::commands::CommonArgs;

/// Build an engine from the common CLI arguments: optional config file,
/// optional level override, optional persistent stats database.
pub async fn build_engine(args: &CommonArgs) -> Result<Arc<DetectionEngine>, PhishGuardError> {
    let mut config = match &args.config {
        Some(path) => parse_config(Path::new(path)).await?,
        None => DetectorConfig::default(),
    };

    if let Some(level) = &args.level {
        config.detection.level = level
            .parse()
            .map_err(PhishGuardError::Config)?;
    }

    let db = match &args.db {
        Some(path) => Some(Database::new(path)?),
        None => None,
    };
    let store: Option<Arc<dyn StatsStore>> =
        db.clone().map(|db| Arc::new(db) as Arc<dyn StatsStore>);

    let engine = Arc::new(DetectionEngine::new(config, store));

    // Persisted state survives restarts; level setting wins over config
    // unless the flag overrode it explicitly.
    if let Some(db) = &db {
        let stats = db.load_stats()?;
        let history = db.load_history()?;
        let weekly = db.load_weekly(chrono::Utc::now())?;
        engine.stats_aggregator().restore(stats, history, weekly);

        if args.level.is_none() {
            if let Some(level) = db.detection_level()? {
                engine.set_detection_level(level);
            }
        } else {
            db.set_detection_level(engine.detection_level())?;
        }

        let background = db.flag("background_scan_enabled", engine.background_scan_enabled())?;
        engine.set_background_scan_enabled(background);
    }

    Ok(engine)
}
