use super::severity::Severity;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

/// One logging call, stamped with its tag and label.
///
/// Records are built by the facade, routed synchronously by the dispatcher and
/// then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub severity: Severity,
    pub tag: String,
    pub label: String,
    pub message: String,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
    /// Serialized error (JSON text) for events logged through `Logger::error`.
    pub err: Option<String>,
}

impl EventRecord {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            tag: String::new(),
            label: String::new(),
            message: message.into(),
            data: Value::Object(Map::new()),
            timestamp: Utc::now(),
            err: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_err(mut self, err: impl Into<String>) -> Self {
        self.err = Some(err.into());
        self
    }

    /// Record fields in their wire shape: numeric `level`, epoch-millis `time`,
    /// `msg`, optional `err`, then `data`, `tag` and `label`.
    pub fn envelope(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("level".into(), json!(self.severity.value()));
        out.insert("time".into(), json!(self.timestamp.timestamp_millis()));
        out.insert("msg".into(), Value::String(self.message.clone()));
        if let Some(err) = &self.err {
            out.insert("err".into(), Value::String(err.clone()));
        }
        out.insert("data".into(), self.data.clone());
        out.insert("tag".into(), Value::String(self.tag.clone()));
        out.insert("label".into(), Value::String(self.label.clone()));
        out
    }

    /// The envelope as JSON text, the form the error-tracking sink consumes.
    pub fn to_envelope_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.envelope())
    }
}

/// Payload accepted by `Logger::error`.
#[derive(Debug, Clone, PartialEq)]
pub enum Reportable {
    Message(String),
    Structured(Map<String, Value>),
}

impl Reportable {
    /// Capture an error's message, short type name and source chain.
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        let mut fields = Map::new();
        fields.insert("name".into(), Value::String(short_type_name::<E>()));
        fields.insert("message".into(), Value::String(err.to_string()));

        let mut sources = Vec::new();
        let mut current = err.source();
        while let Some(source) = current {
            sources.push(Value::String(source.to_string()));
            current = source.source();
        }
        if !sources.is_empty() {
            fields.insert("sources".into(), Value::Array(sources));
        }

        Reportable::Structured(fields)
    }

    /// Text used as the event message.
    pub fn message(&self) -> String {
        match self {
            Reportable::Message(text) => text.clone(),
            Reportable::Structured(fields) => fields
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// JSON text carried in the record's `err` field.
    pub fn to_serialized(&self) -> String {
        match self {
            Reportable::Message(text) => Value::String(text.clone()).to_string(),
            Reportable::Structured(fields) => Value::Object(fields.clone()).to_string(),
        }
    }
}

impl Default for Reportable {
    fn default() -> Self {
        Reportable::Message(String::new())
    }
}

impl From<&str> for Reportable {
    fn from(text: &str) -> Self {
        Reportable::Message(text.to_string())
    }
}

impl From<String> for Reportable {
    fn from(text: String) -> Self {
        Reportable::Message(text)
    }
}

impl From<Map<String, Value>> for Reportable {
    fn from(fields: Map<String, Value>) -> Self {
        Reportable::Structured(fields)
    }
}

impl From<Value> for Reportable {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Reportable::Message(text),
            Value::Object(fields) => Reportable::Structured(fields),
            Value::Null => Reportable::default(),
            other => Reportable::Message(other.to_string()),
        }
    }
}

fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .trim_start_matches("dyn ")
        .to_string()
}
