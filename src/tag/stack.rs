use super::{TagSource, derive_tag};
use regex::Regex;
use std::backtrace::Backtrace;
use std::panic::Location;
use std::sync::OnceLock;

static FRAME_HEADER: OnceLock<Option<Regex>> = OnceLock::new();

// Frames from the runtime and the backtrace machinery itself.
const SKIPPED_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "backtrace::",
    "<std::",
    "<core::",
    "<alloc::",
    "__rust",
];

/// Tag derived from a captured backtrace.
///
/// The backtrace is rendered as a stack text whose first line is a header and
/// whose following lines are frames, innermost first:
///
/// ```text
/// Error
///     at StackTagSource::capture (...)       <- 1
///     at <StackTagSource as TagSource>::tag  <- 2
///     at Logger::log                          <- 3
///     at Logger::info                         <- 4, the facade frame
///     at caller (...)                         <- 5, the caller frame
/// ```
///
/// The fixed offsets assume that exact call depth. Without debug info, or if
/// the optimizer merges frames, paths go missing and the tag is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackTagSource;

impl StackTagSource {
    pub fn new() -> Self {
        Self
    }

    #[inline(never)]
    fn capture(&self) -> String {
        render_stack(&Backtrace::force_capture().to_string())
    }
}

impl TagSource for StackTagSource {
    #[inline(never)]
    fn tag(&self, _call_site: &Location<'_>) -> String {
        derive_tag(&self.capture())
    }
}

fn frame_header_regex() -> Option<&'static Regex> {
    FRAME_HEADER
        .get_or_init(|| Regex::new(r"^\s*\d+:\s+(.+)$").ok())
        .as_ref()
}

/// Turn `std::backtrace` output into one line per frame, runtime frames
/// dropped.
pub(crate) fn render_stack(backtrace: &str) -> String {
    let mut frames: Vec<(String, Option<String>)> = Vec::new();

    for line in backtrace.lines() {
        if let Some(caps) = frame_header_regex().and_then(|re| re.captures(line)) {
            frames.push((caps[1].trim().to_string(), None));
        } else if let Some(location) = line.trim_start().strip_prefix("at ")
            && let Some(frame) = frames.last_mut()
            && frame.1.is_none()
        {
            frame.1 = Some(location.trim().to_string());
        }
    }

    let mut out = String::from("Error");
    for (symbol, location) in frames
        .into_iter()
        .filter(|(symbol, _)| !SKIPPED_PREFIXES.iter().any(|p| symbol.starts_with(p)))
    {
        out.push('\n');
        match location {
            Some(location) => out.push_str(&format!("    at {symbol} ({location})")),
            None => out.push_str(&format!("    at {symbol}")),
        }
    }
    out
}
