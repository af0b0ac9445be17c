use anyhow::Context;
use clap::Parser;
use rask_log_facade::{Logger, LoggerConfig, Reportable, logging};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Logger configuration file (.json, or TOML otherwise)
    #[arg(long, env = "LOG_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
#[error("User is undefined")]
struct UndefinedUser;

fn default_config() -> anyhow::Result<LoggerConfig> {
    Ok(LoggerConfig::from_value(json!({
        "transports": {
            "console": { "level": ["trace", "warn", "info", "debug", "error"] }
        },
        "version": rask_log_facade::VERSION,
        "app_name": "rask-log-facade",
        "env": "development",
    }))?)
}

fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LoggerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => default_config()?,
    };
    let logger = Logger::new(config).context("building logger")?;

    logger.error("test", json!({ "key": "value" }));
    logger.error(UndefinedUser.to_string(), json!({ "otherData": "data" }));
    logger.error(Reportable::from_error(&UndefinedUser), None);
    logger.warn("some message", json!({ "key": "value" }));
    logger.info(
        "some message",
        json!({
            "body": { "provider": "google" },
            "headers": {
                "content-type": "application/json",
                "content-length": "5885",
                "connection": "keep-alive"
            }
        }),
    );
    logger.debug("some message", json!({ "key": "value" }));
    logger.trace("some message", None);

    logger.close()?;
    Ok(())
}
