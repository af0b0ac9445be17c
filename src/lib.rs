#![deny(rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::missing_errors_doc,      // Errors are the enum variants next to each fn
    clippy::missing_panics_doc,      // No panicking paths outside tests
    clippy::module_name_repetitions, // e.g. SinkError in sink module
    clippy::must_use_candidate,      // DispatchReport is informational
    clippy::doc_markdown
)]

pub mod config;
pub mod dispatch;
pub mod domain;
pub mod format;
pub mod logger;
pub mod logging;
pub mod reporter;
pub mod sink;
pub mod tag;
pub mod test_support;
pub mod timing;

// Re-export main types for easy access
pub use config::LoggerConfig;
pub use dispatch::DispatchReport;
pub use domain::{LoggerError, Reportable, Severity};
pub use logger::{Logger, LoggerBuilder};
pub use tag::{CallSiteTag, FixedTag, StackTagSource, TagSource};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
