use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

/// Install the process-wide subscriber for the facade's own diagnostics.
/// Uses JSON output when `RUST_LOG_FORMAT=json`, compact text otherwise.
/// Only the first call has any effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        let use_json = std::env::var("RUST_LOG_FORMAT")
            .map(|v| v == "json")
            .unwrap_or(false);

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::default().add_directive(Level::INFO.into()));

        // try_init: a host application may already own the global subscriber
        let result = if use_json {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_current_span(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .with(filter)
                .try_init()
        };

        if let Err(e) = result {
            eprintln!("tracing subscriber not installed: {e}");
        }
    });
}
