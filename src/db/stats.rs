use chrono::{DateTime, Utc};
use rusqlite::params;

use super::Database;
use crate::errors::PhishGuardError;
use crate::stats::{
    DayBucket, DetectionStats, HistoryEntry, StatsStore, WeeklyHistogram, HISTORY_CAP,
};

impl Database {
    pub fn save_stats(&self, stats: &DetectionStats) -> Result<(), PhishGuardError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO detection_stats (id, total_scanned, phishing_detected, last_detection_at)
             VALUES (1, ?1, ?2, ?3)",
            params![
                stats.total_scanned,
                stats.phishing_detected,
                stats.last_detection_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    pub fn load_stats(&self) -> Result<DetectionStats, PhishGuardError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT total_scanned, phishing_detected, last_detection_at FROM detection_stats WHERE id = 1",
        )?;

        match stmt.query_row([], |row| {
            Ok((
                row.get::<_, u64>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        }) {
            Ok((total_scanned, phishing_detected, last)) => Ok(DetectionStats {
                total_scanned,
                phishing_detected,
                last_detection_at: last.and_then(|s| {
                    DateTime::parse_from_rfc3339(&s).ok().map(|t| t.with_timezone(&Utc))
                }),
            }),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(DetectionStats::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Append one history entry and trim past the cap, oldest first.
    pub fn append_history(&self, entry: &HistoryEntry) -> Result<(), PhishGuardError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO detection_history
                (timestamp, url, subject_type, confidence, action, threat_type, platform)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.timestamp.to_rfc3339(),
                entry.url,
                entry.subject_type,
                entry.confidence,
                entry.action,
                entry.threat_type,
                entry.platform,
            ],
        )?;
        conn.execute(
            "DELETE FROM detection_history WHERE id NOT IN
                (SELECT id FROM detection_history ORDER BY id DESC LIMIT ?1)",
            params![HISTORY_CAP as i64],
        )?;
        Ok(())
    }

    pub fn load_history(&self) -> Result<Vec<HistoryEntry>, PhishGuardError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT timestamp, url, subject_type, confidence, action, threat_type, platform
             FROM detection_history ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(HistoryEntry {
                timestamp: row
                    .get::<_, String>(0)
                    .map(|s| {
                        DateTime::parse_from_rfc3339(&s)
                            .map(|t| t.with_timezone(&Utc))
                            .unwrap_or_else(|_| Utc::now())
                    })?,
                url: row.get(1)?,
                subject_type: row.get(2)?,
                confidence: row.get(3)?,
                action: row.get(4)?,
                threat_type: row.get(5)?,
                platform: row.get(6)?,
            })
        })?;

        let mut history = Vec::new();
        for row in rows {
            history.push(row?);
        }
        Ok(history)
    }

    pub fn save_weekly(&self, weekly: &WeeklyHistogram) -> Result<(), PhishGuardError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM weekly_stats", [])?;
        for (position, bucket) in weekly.days.iter().enumerate() {
            conn.execute(
                "INSERT INTO weekly_stats (position, day_label, scans, detections)
                 VALUES (?1, ?2, ?3, ?4)",
                params![position as i64, bucket.label, bucket.scans, bucket.detections],
            )?;
        }
        Ok(())
    }

    /// Load the histogram rolled forward to `today`. Day-boundary roll-off
    /// happens here, not in the aggregator.
    pub fn load_weekly(&self, today: DateTime<Utc>) -> Result<WeeklyHistogram, PhishGuardError> {
        let stored = {
            let conn = self.conn.lock().unwrap();
            let mut stmt = conn.prepare(
                "SELECT day_label, scans, detections FROM weekly_stats ORDER BY position ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(DayBucket {
                    label: row.get(0)?,
                    scans: row.get(1)?,
                    detections: row.get(2)?,
                })
            })?;

            let mut days = Vec::new();
            for row in rows {
                days.push(row?);
            }
            days
        };

        if stored.is_empty() {
            return Ok(WeeklyHistogram::trailing_week(today));
        }
        Ok(WeeklyHistogram { days: stored }.rolled_forward_to(today))
    }
}

impl StatsStore for Database {
    fn persist(
        &self,
        stats: &DetectionStats,
        new_entry: Option<&HistoryEntry>,
        weekly: &WeeklyHistogram,
    ) -> Result<(), PhishGuardError> {
        self.save_stats(stats)?;
        if let Some(entry) = new_entry {
            self.append_history(entry)?;
        }
        self.save_weekly(weekly)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn entry(url: &str) -> HistoryEntry {
        HistoryEntry {
            timestamp: Utc::now(),
            url: url.to_string(),
            subject_type: "url".to_string(),
            confidence: 0.8,
            action: "Detected".to_string(),
            threat_type: None,
            platform: None,
        }
    }

    #[test]
    fn test_stats_round_trip() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.load_stats().unwrap(), DetectionStats::default());

        let stats = DetectionStats {
            total_scanned: 10,
            phishing_detected: 3,
            last_detection_at: Some(Utc::now()),
        };
        db.save_stats(&stats).unwrap();

        let loaded = db.load_stats().unwrap();
        assert_eq!(loaded.total_scanned, 10);
        assert_eq!(loaded.phishing_detected, 3);
        assert!(loaded.last_detection_at.is_some());
    }

    #[test]
    fn test_history_trimmed_at_cap() {
        let db = Database::in_memory().unwrap();
        for i in 0..(HISTORY_CAP + 10) {
            db.append_history(&entry(&format!("https://phish{}.example", i))).unwrap();
        }
        let history = db.load_history().unwrap();
        assert_eq!(history.len(), HISTORY_CAP);
        // Oldest dropped first
        assert_eq!(history[0].url, "https://phish10.example");
    }

    #[test]
    fn test_weekly_empty_seeds_trailing_week() {
        let db = Database::in_memory().unwrap();
        let weekly = db.load_weekly(Utc::now()).unwrap();
        assert_eq!(weekly.days.len(), 7);
        assert!(weekly.days.iter().all(|d| d.scans == 0 && d.detections == 0));
    }

    #[test]
    fn test_weekly_rolls_forward_on_load() {
        let db = Database::in_memory().unwrap();
        let yesterday = Utc::now() - ChronoDuration::days(1);
        let mut weekly = WeeklyHistogram::trailing_week(yesterday);
        weekly.days.last_mut().unwrap().scans = 4;
        db.save_weekly(&weekly).unwrap();

        let loaded = db.load_weekly(Utc::now()).unwrap();
        assert_eq!(loaded.days.len(), 7);
        assert_eq!(loaded.days.last().unwrap().scans, 0);
        let yesterday_label = crate::stats::day_label(yesterday);
        let carried = loaded.days.iter().find(|d| d.label == yesterday_label).unwrap();
        assert_eq!(carried.scans, 4);
    }
}
