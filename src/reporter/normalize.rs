use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// A structured error rebuilt from serialized fields.
///
/// `name` and `message` default to `"Error"` and the empty string; every other
/// field of the source value is kept in `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedError {
    pub name: String,
    pub message: String,
    pub fields: Map<String, Value>,
}

impl Default for TrackedError {
    fn default() -> Self {
        Self {
            name: "Error".to_string(),
            message: String::new(),
            fields: Map::new(),
        }
    }
}

impl TrackedError {
    /// Copy the value's own fields onto a fresh error.
    pub fn from_value(value: Value) -> Self {
        let mut error = Self::default();
        let fields = match value {
            Value::Object(fields) => fields,
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
            _ => return error,
        };

        for (key, value) in fields {
            match (key.as_str(), value) {
                ("name", Value::String(name)) => error.name = name,
                ("message", Value::String(message)) => error.message = message,
                (_, value) => {
                    error.fields.insert(key, value);
                }
            }
        }
        error
    }
}

/// The value handed to the error-tracking client.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorValue {
    Message(String),
    Tracked(TrackedError),
}

impl ErrorValue {
    pub fn error_class(&self) -> &str {
        match self {
            ErrorValue::Message(_) => "Error",
            ErrorValue::Tracked(error) => &error.name,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ErrorValue::Message(message) => message,
            ErrorValue::Tracked(error) => &error.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPayload {
    pub error: ErrorValue,
    pub context_data: Map<String, Value>,
}

/// Rebuild the error value and its context from a serialized event.
///
/// Only the outer payload must be valid JSON. An `err` field that does not
/// parse is used as plain text.
pub fn normalize(serialized: &str) -> Result<ErrorPayload, NormalizeError> {
    let outer: Value = serde_json::from_str(serialized)?;

    let raw = match outer.get("err") {
        Some(err) if is_truthy(err) => match err {
            Value::String(text) => parse_json_or_string(text),
            other => other.clone(),
        },
        _ => outer.get("msg").cloned().unwrap_or(Value::Null),
    };

    let error = match raw {
        Value::String(message) => ErrorValue::Message(message),
        other => ErrorValue::Tracked(TrackedError::from_value(other)),
    };

    Ok(ErrorPayload {
        error,
        context_data: context_data(outer.get("data"), outer.get("tag")),
    })
}

fn parse_json_or_string(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn context_data(data: Option<&Value>, tag: Option<&Value>) -> Map<String, Value> {
    let mut out = Map::new();
    if let Some(tag) = tag {
        out.insert("tag".into(), tag.clone());
    }
    match data {
        Some(Value::String(text)) if !text.is_empty() => {
            out.insert("message".into(), Value::String(text.clone()));
        }
        Some(Value::Object(fields)) => {
            for (key, value) in fields {
                out.insert(key.clone(), value.clone());
            }
        }
        Some(Value::Array(items)) => {
            for (index, value) in items.iter().enumerate() {
                out.insert(index.to_string(), value.clone());
            }
        }
        _ => {}
    }
    out
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
