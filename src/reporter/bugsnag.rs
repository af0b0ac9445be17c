use super::{ErrorPayload, ErrorReporter, ErrorValue, ReporterError};
use crate::config::BugsnagTransport;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_NOTIFY_ENDPOINT: &str = "https://notify.bugsnag.com";

const PAYLOAD_VERSION: &str = "4";
const NOTIFIER_NAME: &str = "rask-log-facade";
const NOTIFIER_URL: &str = "https://github.com/Kaikei-e/Alt";

#[derive(Debug, Clone)]
pub struct BugsnagConfig {
    pub api_key: String,
    pub endpoint: Url,
    pub app_version: String,
    pub release_stage: String,
    pub timeout: Duration,
}

impl BugsnagConfig {
    pub fn new(
        api_key: impl Into<String>,
        app_version: impl Into<String>,
        release_stage: impl Into<String>,
    ) -> Result<Self, ReporterError> {
        Self::with_endpoint(api_key, DEFAULT_NOTIFY_ENDPOINT, app_version, release_stage)
    }

    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: &str,
        app_version: impl Into<String>,
        release_stage: impl Into<String>,
    ) -> Result<Self, ReporterError> {
        let endpoint: Url = endpoint.parse().map_err(|e| {
            ReporterError::InvalidConfiguration(format!("Invalid notify endpoint: {e}"))
        })?;

        Ok(Self {
            api_key: api_key.into(),
            endpoint,
            app_version: app_version.into(),
            release_stage: release_stage.into(),
            timeout: Duration::from_secs(10),
        })
    }

    /// Registration data from the transport settings plus release metadata.
    pub fn from_transport(
        transport: &BugsnagTransport,
        app_version: &str,
        release_stage: &str,
    ) -> Result<Self, ReporterError> {
        Self::with_endpoint(
            transport.api_key.clone(),
            transport.endpoint.as_deref().unwrap_or(DEFAULT_NOTIFY_ENDPOINT),
            app_version,
            release_stage,
        )
    }
}

/// Bugsnag notifier backed by a dedicated delivery thread.
///
/// The blocking HTTP client lives on the worker thread, so `notify` works the
/// same from synchronous code and from inside a tokio runtime.
pub struct BugsnagReporter {
    sender: Mutex<Option<UnboundedSender<ErrorPayload>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BugsnagReporter {
    pub fn start(config: BugsnagConfig) -> Result<Self, ReporterError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = std::thread::Builder::new()
            .name("bugsnag-notifier".to_string())
            .spawn(move || run_worker(config, receiver))
            .map_err(|e| {
                ReporterError::InvalidConfiguration(format!("Failed to spawn notifier: {e}"))
            })?;

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        })
    }
}

impl std::fmt::Debug for BugsnagReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BugsnagReporter")
            .field("running", &self.sender.lock().is_some())
            .finish()
    }
}

impl ErrorReporter for BugsnagReporter {
    fn notify(&self, payload: ErrorPayload) -> Result<(), ReporterError> {
        let guard = self.sender.lock();
        let sender = guard.as_ref().ok_or(ReporterError::WorkerGone)?;
        sender.send(payload).map_err(|_| ReporterError::WorkerGone)
    }

    fn shutdown(&self) -> Result<(), ReporterError> {
        // Dropping the sender ends the worker loop once the queue drains.
        drop(self.sender.lock().take());
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            worker.join().map_err(|_| ReporterError::WorkerGone)?;
            debug!("Bugsnag notifier stopped");
        }
        Ok(())
    }
}

fn run_worker(config: BugsnagConfig, mut receiver: UnboundedReceiver<ErrorPayload>) {
    let client = match reqwest::blocking::Client::builder()
        .timeout(config.timeout)
        .user_agent(format!("{NOTIFIER_NAME}/{}", crate::VERSION))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Failed to build Bugsnag client, error reports will be dropped");
            return;
        }
    };

    while let Some(payload) = receiver.blocking_recv() {
        if let Err(e) = deliver(&client, &config, &payload) {
            warn!(error = %e, endpoint = %config.endpoint, "Failed to deliver error report");
        }
    }
}

fn deliver(
    client: &reqwest::blocking::Client,
    config: &BugsnagConfig,
    payload: &ErrorPayload,
) -> Result<(), ReporterError> {
    let response = client
        .post(config.endpoint.clone())
        .header("Bugsnag-Api-Key", &config.api_key)
        .header("Bugsnag-Payload-Version", PAYLOAD_VERSION)
        .header(
            "Bugsnag-Sent-At",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        )
        .json(&notify_body(config, payload))
        .send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(ReporterError::Http {
            status: status.as_u16(),
            message: response.text().unwrap_or_default(),
        });
    }
    Ok(())
}

/// Bugsnag error reporting API v4 body for a single handled event.
pub fn notify_body(config: &BugsnagConfig, payload: &ErrorPayload) -> Value {
    let mut meta_data = serde_json::Map::new();
    meta_data.insert("custom".into(), Value::Object(payload.context_data.clone()));
    if let ErrorValue::Tracked(error) = &payload.error
        && !error.fields.is_empty()
    {
        meta_data.insert("error".into(), Value::Object(error.fields.clone()));
    }

    json!({
        "apiKey": config.api_key,
        "payloadVersion": PAYLOAD_VERSION,
        "notifier": {
            "name": NOTIFIER_NAME,
            "version": crate::VERSION,
            "url": NOTIFIER_URL,
        },
        "events": [{
            "exceptions": [{
                "errorClass": payload.error.error_class(),
                "message": payload.error.message(),
                "stacktrace": [],
            }],
            "severity": "error",
            "unhandled": false,
            "severityReason": { "type": "handledException" },
            "metaData": meta_data,
            "app": {
                "version": config.app_version,
                "releaseStage": config.release_stage,
            },
        }],
    })
}
