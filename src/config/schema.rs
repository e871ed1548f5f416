use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Advisory JSON schema for the YAML config. Violations warn, they don't fail.
pub static CONFIG_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "detection": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "level": { "enum": ["low", "medium", "high"] },
                    "scan_enabled": { "type": "boolean" },
                    "notifications_enabled": { "type": "boolean" },
                    "background_scan_enabled": { "type": "boolean" }
                }
            },
            "signals": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "reputation": {
                        "type": "object",
                        "required": ["api_key"],
                        "properties": {
                            "api_key": { "type": "string" },
                            "base_url": { "type": "string" }
                        }
                    },
                    "generative": {
                        "type": "object",
                        "required": ["api_key"],
                        "properties": {
                            "api_key": { "type": "string" },
                            "model": { "type": "string" },
                            "base_url": { "type": "string" }
                        }
                    },
                    "remote_ml": {
                        "type": "object",
                        "required": ["endpoint"],
                        "properties": {
                            "endpoint": { "type": "string" }
                        }
                    }
                }
            },
            "cache": {
                "type": "object",
                "properties": {
                    "max_entries": { "type": "integer", "minimum": 1 }
                }
            }
        }
    })
});
