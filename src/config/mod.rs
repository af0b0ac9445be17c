mod schema;
pub mod serde_helpers;

use crate::domain::LevelSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use schema::{config_schema, validate_value};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("File error: {0}")]
    File(#[from] std::io::Error),
}

/// Logger configuration: the enabled transports plus release metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub transports: TransportsConfig,
    pub version: String,
    pub app_name: String,
    pub env: String,
}

/// One optional entry per sink kind. Missing, `null` or `false` disables it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportsConfig {
    #[serde(
        default,
        deserialize_with = "serde_helpers::enabled",
        skip_serializing_if = "Option::is_none"
    )]
    pub console: Option<ConsoleTransport>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::enabled",
        skip_serializing_if = "Option::is_none"
    )]
    pub file: Option<FileTransport>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::enabled",
        skip_serializing_if = "Option::is_none"
    )]
    pub logstash: Option<LogstashTransport>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::enabled",
        skip_serializing_if = "Option::is_none"
    )]
    pub bugsnag: Option<BugsnagTransport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleTransport {
    pub level: LevelSpec,
    /// Color the severity label (ANSI). Defaults to on.
    #[serde(default = "serde_helpers::default_true")]
    pub colors: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileTransport {
    pub level: LevelSpec,
    pub filepath: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogstashTransport {
    pub level: LevelSpec,
    pub host: String,
    pub port: u16,
    #[serde(rename = "type")]
    pub socket: SocketType,
    #[serde(default)]
    pub format: WireFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketType {
    Udp,
    Tcp,
}

/// Text put on the logstash socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Human-readable file-style line
    #[default]
    Pretty,
    /// Structured JSON record with `timeString`
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugsnagTransport {
    pub level: LevelSpec,
    pub api_key: String,
    /// Notify endpoint override (defaults to the public Bugsnag endpoint)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl LoggerConfig {
    /// Validate a raw value against the schema, then deserialize it.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        validate_value(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let value: toml::Value = toml::from_str(content)?;
        Self::from_value(serde_json::to_value(value)?)
    }

    /// Load from a `.json` file, or from TOML for any other extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Re-run schema validation on an already typed configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_value(&serde_json::to_value(self)?)
    }

    /// Service label stamped on every event.
    pub fn label(&self) -> &str {
        &self.app_name
    }
}
