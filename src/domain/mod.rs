//! Domain layer for rask-log-facade.
//!
//! Contains the canonical types shared across all modules:
//! - `Severity` / `LevelSet` / `LevelSpec`: the severity model and its
//!   set-membership predicate
//! - `EventRecord`: one logging call on its way to the sinks
//! - `Reportable`: the payload accepted by `Logger::error`
//! - `LoggerError`: top-level error type

pub mod error;
pub mod event;
pub mod severity;

pub use error::LoggerError;
pub use event::{EventRecord, Reportable};
pub use severity::{LevelSet, LevelSpec, Severity, UnknownSeverity, is_allowed};
