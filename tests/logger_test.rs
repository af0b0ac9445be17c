use rask_log_facade::config::ConfigError;
use rask_log_facade::reporter::ErrorValue;
use rask_log_facade::sink::SinkKind;
use rask_log_facade::test_support::{MemoryWriter, RecordingReporter};
use rask_log_facade::{FixedTag, Logger, LoggerConfig, LoggerError, Reportable};
use regex::Regex;
use serde_json::{Value, json};
use std::io::{BufRead, BufReader};
use std::net::{TcpListener, UdpSocket};
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

fn config(transports: Value) -> LoggerConfig {
    LoggerConfig::from_value(json!({
        "transports": transports,
        "version": "5",
        "app_name": "app-logger",
        "env": "test",
    }))
    .unwrap()
}

fn file_logger(path: &Path, level: Value) -> Logger {
    Logger::with_tag_source(
        config(json!({ "file": { "level": level, "filepath": path } })),
        Box::new(FixedTag::new("test_tag")),
    )
    .unwrap()
}

#[test]
fn test_file_sink_appends_formatted_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.log");

    let logger = file_logger(&path, json!(["warn", "info"]));
    logger.warn("test_msg", json!({ "data": "test_data" }));
    logger.info("second", None);
    logger.close().unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let line = Regex::new(r#"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} (WARN|INFO) app-logger / test_tag "#)
        .unwrap();
    assert!(lines.iter().all(|l| line.is_match(l)), "{content}");
    assert!(lines[0].ends_with(
        r#"WARN app-logger / test_tag "test_msg", {"data":"test_data","version":"5","env":"test"}"#
    ));
    assert!(lines[1].ends_with(r#""second", {"version":"5","env":"test"}"#));
}

#[test]
fn test_file_sink_never_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.log");

    for run in 0..2 {
        let logger = file_logger(&path, json!("info"));
        logger.info(format!("run {run}"), None);
        logger.close().unwrap();
    }

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.contains("\"run 0\""));
    assert!(content.contains("\"run 1\""));
}

#[test]
fn test_scalar_and_single_element_levels_agree() {
    let dir = tempfile::tempdir().unwrap();
    let scalar = dir.path().join("scalar.log");
    let list = dir.path().join("list.log");

    let loggers = [
        file_logger(&scalar, json!("warn")),
        file_logger(&list, json!(["warn"])),
    ];
    for logger in &loggers {
        logger.trace("t", None);
        logger.debug("d", None);
        logger.info("i", None);
        logger.warn("w", None);
        logger.error("e", None);
        logger.close().unwrap();
    }

    let scalar = std::fs::read_to_string(&scalar).unwrap();
    let list = std::fs::read_to_string(&list).unwrap();
    assert_eq!(scalar.lines().count(), 1);
    assert_eq!(list.lines().count(), 1);
    assert!(scalar.contains(" WARN "));
    assert!(list.contains(" WARN "));
}

#[test]
fn test_no_threshold_semantics() {
    let memory = MemoryWriter::new();
    let logger = Logger::builder(config(json!({
        "console": { "level": "info", "colors": false }
    })))
    .console_writer(Box::new(memory.clone()))
    .build()
    .unwrap();

    assert_eq!(logger.error("above info", None).attempted, 0);
    assert_eq!(logger.debug("below info", None).attempted, 0);
    assert_eq!(logger.info("exactly info", None).written, 1);
    assert_eq!(memory.lines().len(), 1);
}

#[test]
fn test_all_transports_disabled() {
    let logger = Logger::new(config(json!({
        "console": false,
        "file": false,
        "logstash": false,
        "bugsnag": false
    })))
    .unwrap();

    assert_eq!(logger.sink_count(), 0);
    assert_eq!(logger.error("nothing", None).attempted, 0);
    assert_eq!(logger.info("nothing", None).attempted, 0);
    logger.close().unwrap();
}

#[test]
fn test_missing_required_fields_rejected() {
    let base = json!({
        "transports": {},
        "version": "5",
        "app_name": "app-logger",
        "env": "test",
    });
    for field in ["transports", "version", "app_name", "env"] {
        let mut value = base.clone();
        value.as_object_mut().unwrap().remove(field);
        match Logger::from_value(value) {
            Err(LoggerError::Config(ConfigError::Invalid(message))) => {
                assert!(message.contains(field), "{field}: {message}");
            }
            other => panic!("{field}: expected a configuration error, got {other:?}"),
        }
    }
}

#[test]
fn test_missing_transport_field_rejected() {
    let result = Logger::from_value(json!({
        "transports": { "file": { "level": "info" } },
        "version": "5",
        "app_name": "app-logger",
        "env": "test",
    }));
    assert!(matches!(
        result,
        Err(LoggerError::Config(ConfigError::Invalid(_)))
    ));
}

#[test]
fn test_udp_sink_sends_pretty_line() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let port = receiver.local_addr().unwrap().port();

    let logger = Logger::with_tag_source(
        config(json!({
            "logstash": { "level": "warn", "host": "127.0.0.1", "port": port, "type": "udp" }
        })),
        Box::new(FixedTag::new("net")),
    )
    .unwrap();
    assert_eq!(logger.sink_kinds(), vec![SinkKind::Network]);

    let report = logger.warn("over udp", json!({ "key": "value" }));
    assert_eq!(report.written, 1);

    let mut buf = [0u8; 1024];
    let (len, _) = receiver.recv_from(&mut buf).unwrap();
    let datagram = String::from_utf8_lossy(&buf[..len]);
    assert!(datagram.ends_with(
        "WARN app-logger / net \"over udp\", {\"key\":\"value\",\"version\":\"5\",\"env\":\"test\"}\n"
    ));
    logger.close().unwrap();
}

#[test]
fn test_tcp_sink_sends_structured_record() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let logger = Logger::with_tag_source(
        config(json!({
            "logstash": {
                "level": ["info"],
                "host": "127.0.0.1",
                "port": port,
                "type": "tcp",
                "format": "json"
            }
        })),
        Box::new(FixedTag::new("net")),
    )
    .unwrap();

    logger.info("over tcp", None);
    logger.close().unwrap();

    let (socket, _) = listener.accept().unwrap();
    let mut line = String::new();
    BufReader::new(socket).read_line(&mut line).unwrap();

    let record: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(record["level"], "info");
    assert_eq!(record["msg"], "over tcp");
    assert_eq!(record["tag"], "net");
    assert_eq!(record["label"], "app-logger");
    assert_eq!(record["data"], json!({ "version": "5", "env": "test" }));
    assert!(record["timeString"].as_str().unwrap().contains(" GMT"));
}

#[test]
fn test_unreachable_network_sink_does_not_block_file() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.log");

    let logger = Logger::new(config(json!({
        "logstash": { "level": "error", "host": "127.0.0.1", "port": port, "type": "tcp" },
        "file": { "level": "error", "filepath": path }
    })))
    .unwrap();

    let report = logger.error("still written", None);
    assert_eq!(report.attempted, 2);
    assert_eq!(report.failed, 1);
    logger.close().unwrap();

    assert!(std::fs::read_to_string(&path).unwrap().contains("\"still written\""));
}

#[test]
fn test_error_tracking_receives_std_error() {
    #[derive(Debug, thiserror::Error)]
    #[error("User is undefined")]
    struct UndefinedUser;

    let reporter = Arc::new(RecordingReporter::new());
    let logger = Logger::builder(config(json!({
        "bugsnag": { "level": ["error"], "api_key": "key" }
    })))
    .tag_source(Box::new(FixedTag::new("users")))
    .reporter(reporter.clone())
    .build()
    .unwrap();

    logger.error(Reportable::from_error(&UndefinedUser), json!({ "otherData": "data" }));
    logger.warn("not tracked", None);
    logger.close().unwrap();

    let payloads = reporter.payloads();
    assert_eq!(payloads.len(), 1);
    let ErrorValue::Tracked(error) = &payloads[0].error else {
        panic!("expected a tracked error");
    };
    assert_eq!(error.name, "UndefinedUser");
    assert_eq!(error.message, "User is undefined");
    assert_eq!(
        Value::Object(payloads[0].context_data.clone()),
        json!({ "tag": "users", "otherData": "data" })
    );
    assert_eq!(reporter.shutdown_count(), 1);
}

#[test]
fn test_stalled_tcp_collector_does_not_hang_logger() {
    // Accepted by the kernel backlog but never read.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let logger = Logger::with_tag_source(
        config(json!({
            "logstash": { "level": "info", "host": "127.0.0.1", "port": port, "type": "tcp" }
        })),
        Box::new(FixedTag::new("net")),
    )
    .unwrap();

    let (done, finished) = mpsc::channel();
    let worker = std::thread::spawn(move || {
        let big = "x".repeat(1 << 20);
        let failed: usize = (0..64).map(|_| logger.info(big.clone(), None).failed).sum();
        let _ = logger.close();
        let _ = done.send(failed);
    });

    let failed = finished
        .recv_timeout(Duration::from_secs(3))
        .expect("logging to a stalled collector should not block");
    assert!(failed >= 1);
    worker.join().unwrap();
    drop(listener);
}

#[test]
fn test_empty_bugsnag_api_key_builds() {
    let logger = Logger::from_value(json!({
        "transports": { "bugsnag": { "level": ["error"], "api_key": "" } },
        "version": "5",
        "app_name": "app-logger",
        "env": "test",
    }))
    .unwrap();
    assert_eq!(logger.sink_kinds(), vec![SinkKind::ErrorTracking]);
    logger.close().unwrap();
}

#[test]
fn test_failing_reporter_does_not_block_console() {
    let console = MemoryWriter::new();
    let reporter = Arc::new(RecordingReporter::new());
    reporter.set_should_fail(true);
    let logger = Logger::builder(config(json!({
        "console": { "level": "error", "colors": false },
        "bugsnag": { "level": ["error"], "api_key": "key" }
    })))
    .tag_source(Box::new(FixedTag::new("jobs")))
    .console_writer(Box::new(console.clone()))
    .reporter(reporter.clone())
    .build()
    .unwrap();

    let report = logger.error("queue stuck", None);
    assert_eq!(report.attempted, 2);
    assert_eq!(report.written, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(console.lines().len(), 1);
    assert!(console.lines()[0].starts_with(r#"error: app-logger / jobs "queue stuck""#));
    assert!(reporter.payloads().is_empty());
    logger.close().unwrap();
}

#[test]
fn test_default_tag_is_caller_path() {
    let console = MemoryWriter::new();
    let logger = Logger::builder(config(json!({ "console": { "level": "info", "colors": false } })))
        .console_writer(Box::new(console.clone()))
        .build()
        .unwrap();

    logger.info("tagged", None);
    assert!(
        console.lines()[0].starts_with(r#"info: app-logger / tests.logger_test "tagged""#),
        "{}",
        console.contents()
    );
}
