use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use jsonschema::{JSONSchema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::contracts::ValidationMode;

pub const DEFAULT_CONFIG_FILE: &str = "cot-guard.jsonc";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub mode: ValidationMode,
}

fn default_logging_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoggingRotation {
    #[default]
    Daily,
    Hourly,
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Directory for JSON log files. Stderr only when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub rotation: LoggingRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_logging_filter(),
            format: LogFormat::default(),
            dir: None,
            rotation: LoggingRotation::default(),
        }
    }
}

impl Config {
    /// Loads `explicit` when given. Otherwise reads `./cot-guard.jsonc` if it
    /// exists and falls back to defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config_value: Value = json5::from_str(&config_content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        validate_against_schema(&config_value)?;

        let mut config: Config =
            serde_json::from_value(config_value).context("failed to deserialize config")?;

        let config_base = config_path.parent().unwrap_or_else(|| Path::new("."));
        if let Some(dir) = config.logging.dir.as_mut()
            && !dir.is_absolute()
        {
            *dir = config_base.join(&*dir);
        }

        Ok(config)
    }
}

pub fn config_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "cot-guard config",
        "type": "object",
        "properties": {
            "$schema": { "type": "string" },
            "validation": {
                "type": "object",
                "properties": {
                    "mode": { "type": "string", "enum": ["lenient", "strict"] }
                },
                "additionalProperties": false
            },
            "logging": {
                "type": "object",
                "properties": {
                    "filter": { "type": "string", "minLength": 1 },
                    "format": { "type": "string", "enum": ["text", "json"] },
                    "dir": { "type": ["string", "null"], "minLength": 1 },
                    "rotation": { "type": "string", "enum": ["daily", "hourly", "never"] }
                },
                "additionalProperties": false
            }
        },
        "additionalProperties": false
    })
}

fn validate_against_schema(config_value: &Value) -> Result<()> {
    let schema = config_schema();
    let compiled =
        JSONSchema::compile(&schema).map_err(|e| anyhow!("failed to compile schema: {e}"))?;

    match compiled.validate(config_value) {
        Ok(()) => Ok(()),
        Err(errors_iter) => {
            let validation_errors: Vec<ValidationError> = errors_iter.collect();
            let messages: Vec<String> = validation_errors
                .into_iter()
                .map(|error| error.to_string())
                .collect();
            Err(anyhow!("config validation failed: {}", messages.join("; ")))
        }
    }
}
