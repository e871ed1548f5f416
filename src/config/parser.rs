use std::path::Path;

use tracing::warn;

use super::credentials::resolve_credential;
use super::schema::CONFIG_SCHEMA;
use super::types::DetectorConfig;
use crate::errors::PhishGuardError;

pub async fn parse_config(path: &Path) -> Result<DetectorConfig, PhishGuardError> {
    if !path.exists() {
        return Err(PhishGuardError::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(PhishGuardError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<DetectorConfig, PhishGuardError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;

    validate_schema(&yaml)?;

    let mut config: DetectorConfig = serde_yaml::from_value(yaml)?;
    resolve_credentials(&mut config);
    validate_endpoints(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), PhishGuardError> {
    let json_str = serde_json::to_string(yaml)
        .map_err(|e| PhishGuardError::Config(format!("Config conversion error: {}", e)))?;
    let json_value: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|e| PhishGuardError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| PhishGuardError::Config(format!("Schema compilation error: {}", e)))?;

    if let Err(errors) = compiled.validate(&json_value) {
        for e in errors {
            // Advisory only: warn, don't fail
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

/// Resolve `$ENV_VAR` credential references in place. An empty resolved key
/// disables the adapter the same way an absent section does.
fn resolve_credentials(config: &mut DetectorConfig) {
    if let Some(reputation) = &mut config.signals.reputation {
        reputation.api_key = resolve_credential(&reputation.api_key);
    }
    if let Some(generative) = &mut config.signals.generative {
        generative.api_key = resolve_credential(&generative.api_key);
    }
}

fn validate_endpoints(config: &DetectorConfig) -> Result<(), PhishGuardError> {
    if let Some(remote_ml) = &config.signals.remote_ml {
        reqwest::Url::parse(&remote_ml.endpoint).map_err(|e| {
            PhishGuardError::Config(format!(
                "Invalid remote_ml endpoint '{}': {}",
                remote_ml.endpoint, e
            ))
        })?;
    }
    Ok(())
}
