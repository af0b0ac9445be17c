//! JSON Schema for the logger configuration.
//!
//! The schema is compiled once and reused; validation reports the first error
//! only, which becomes the `ConfigError::Invalid` message.

use super::ConfigError;
use jsonschema::Validator;
use serde_json::{Value, json};
use std::sync::OnceLock;

static VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();

fn level_schema() -> Value {
    json!({
        "type": ["array", "string"],
        "items": { "enum": ["trace", "debug", "info", "warn", "error"] },
        "if": { "type": "string" },
        "then": { "enum": ["trace", "debug", "info", "warn", "error"] }
    })
}

/// A transport entry may be omitted, `null`, `false` or a settings object.
fn transport_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": ["object", "boolean", "null"],
        "not": { "const": true },
        "if": { "type": "object" },
        "then": {
            "properties": properties,
            "required": required
        }
    })
}

pub fn config_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": {
            "transports": {
                "type": "object",
                "properties": {
                    "console": transport_schema(
                        json!({
                            "level": level_schema(),
                            "colors": { "type": "boolean" }
                        }),
                        &["level"],
                    ),
                    "file": transport_schema(
                        json!({
                            "level": level_schema(),
                            "filepath": { "type": "string" }
                        }),
                        &["level", "filepath"],
                    ),
                    "logstash": transport_schema(
                        json!({
                            "level": level_schema(),
                            "host": { "type": "string" },
                            "port": { "type": "integer", "minimum": 1, "maximum": 65535 },
                            "type": { "type": "string", "enum": ["udp", "tcp"] },
                            "format": { "type": "string", "enum": ["pretty", "json"] }
                        }),
                        &["port", "host", "level", "type"],
                    ),
                    "bugsnag": transport_schema(
                        json!({
                            "level": level_schema(),
                            "api_key": { "type": "string" },
                            "endpoint": { "type": "string" }
                        }),
                        &["api_key", "level"],
                    )
                }
            },
            "version": { "type": "string" },
            "app_name": { "type": "string" },
            "env": { "type": "string" }
        },
        "required": ["transports", "version", "app_name", "env"]
    })
}

fn validator() -> Result<&'static Validator, ConfigError> {
    VALIDATOR
        .get_or_init(|| {
            jsonschema::validator_for(&config_schema())
                .map_err(|e| format!("Schema compilation error: {e}"))
        })
        .as_ref()
        .map_err(|e| ConfigError::Invalid(e.clone()))
}

/// Validate a raw configuration value, surfacing the first error.
pub fn validate_value(instance: &Value) -> Result<(), ConfigError> {
    let validator = validator()?;
    match validator.iter_errors(instance).next() {
        None => Ok(()),
        Some(error) => {
            let path = error.instance_path.to_string();
            let message = if path.is_empty() {
                error.to_string()
            } else {
                format!("{error} at {path}")
            };
            Err(ConfigError::Invalid(message))
        }
    }
}
