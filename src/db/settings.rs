use rusqlite::params;

use super::Database;
use crate::config::DetectionLevel;
use crate::errors::PhishGuardError;

impl Database {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, PhishGuardError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;

        match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), PhishGuardError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn detection_level(&self) -> Result<Option<DetectionLevel>, PhishGuardError> {
        Ok(self
            .get_setting("detection_level")?
            .and_then(|v| v.parse().ok()))
    }

    pub fn set_detection_level(&self, level: DetectionLevel) -> Result<(), PhishGuardError> {
        self.set_setting("detection_level", level.as_str())
    }

    pub fn flag(&self, key: &str, default: bool) -> Result<bool, PhishGuardError> {
        Ok(self
            .get_setting(key)?
            .map(|v| v == "true")
            .unwrap_or(default))
    }

    pub fn set_flag(&self, key: &str, value: bool) -> Result<(), PhishGuardError> {
        self.set_setting(key, if value { "true" } else { "false" })
    }
}
