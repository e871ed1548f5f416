pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS detection_stats (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    total_scanned INTEGER NOT NULL DEFAULT 0,
    phishing_detected INTEGER NOT NULL DEFAULT 0,
    last_detection_at TEXT
);

CREATE TABLE IF NOT EXISTS detection_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    url TEXT NOT NULL,
    subject_type TEXT NOT NULL,
    confidence REAL NOT NULL,
    action TEXT NOT NULL,
    threat_type TEXT,
    platform TEXT
);

CREATE TABLE IF NOT EXISTS weekly_stats (
    position INTEGER PRIMARY KEY,
    day_label TEXT NOT NULL,
    scans INTEGER NOT NULL DEFAULT 0,
    detections INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;
