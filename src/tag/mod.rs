//! Caller tags.
//!
//! A tag is the part of the caller's source path that differs from the
//! facade's own path, with `/` turned into `.`. Given the facade at
//! `/node_modules/mocha/lib/runnable` and a caller at
//! `/node_modules/mocha/lib/bootstrap_node/other`, the tag is
//! `bootstrap_node.other`.
//!
//! Where the two paths come from is pluggable through [`TagSource`]:
//! - [`CallSiteTag`] uses the `#[track_caller]` location of the logging call
//! - [`StackTagSource`] scrapes a captured backtrace, frame by fixed offset
//! - [`FixedTag`] returns an identifier chosen at construction

mod stack;

pub use stack::StackTagSource;

use regex::Regex;
use std::panic::Location;
use std::sync::OnceLock;

/// Line of the facade's own invocation frame in a stack text.
pub const FACADE_FRAME_LINE: usize = 4;
/// Line of the frame that called the facade.
pub const CALLER_FRAME_LINE: usize = 5;

// A path preceded by `/`, `|` or `(` (after any character), or preceded by
// the last space on the line; captured up to the final `.`.
const FRAME_PATH_PATTERN: &str = r".[/|(](.*)\..*|\x20([^ ]*)\.[^ ]*$";

static FRAME_PATH: OnceLock<Option<Regex>> = OnceLock::new();

fn frame_path_regex() -> Option<&'static Regex> {
    FRAME_PATH
        .get_or_init(|| Regex::new(FRAME_PATH_PATTERN).ok())
        .as_ref()
}

/// Computes the tag for one logging call.
pub trait TagSource: Send + Sync {
    fn tag(&self, call_site: &Location<'_>) -> String;
}

/// Explicit caller identity, fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedTag(String);

impl FixedTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

impl TagSource for FixedTag {
    fn tag(&self, _call_site: &Location<'_>) -> String {
        self.0.clone()
    }
}

/// Tag from the source location of the logging call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSiteTag {
    facade_file: String,
}

impl CallSiteTag {
    pub fn new(facade_file: impl Into<String>) -> Self {
        Self {
            facade_file: facade_file.into(),
        }
    }
}

impl TagSource for CallSiteTag {
    fn tag(&self, call_site: &Location<'_>) -> String {
        let facade = extract_path(&frame_line(&self.facade_file, 0, 0));
        let caller = extract_path(&frame_line(
            call_site.file(),
            call_site.line(),
            call_site.column(),
        ));
        tag_from_paths(&facade, &caller)
    }
}

/// Render a location the way a stack frame line reads.
pub(crate) fn frame_line(file: &str, line: u32, column: u32) -> String {
    format!("    at ({file}:{line}:{column})")
}

/// Path-like part of one stack line, without its final extension.
///
/// Returns an empty string when nothing matches.
pub fn extract_path(line: &str) -> String {
    frame_path_regex()
        .and_then(|re| re.captures(line))
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Facade and caller paths taken from a full stack text.
pub fn frame_paths(stack: &str) -> (String, String) {
    let lines: Vec<&str> = stack.split('\n').collect();
    let path_at = |index: usize| {
        lines
            .get(index)
            .map(|line| extract_path(line))
            .unwrap_or_default()
    };
    (path_at(FACADE_FRAME_LINE), path_at(CALLER_FRAME_LINE))
}

/// Tag for a full stack text.
pub fn derive_tag(stack: &str) -> String {
    let (facade, caller) = frame_paths(stack);
    tag_from_paths(&facade, &caller)
}

/// Caller path minus its common prefix with the facade path, dotted.
pub fn tag_from_paths(facade: &str, caller: &str) -> String {
    let common = facade
        .chars()
        .zip(caller.chars())
        .take_while(|(a, b)| a == b)
        .count();
    caller.chars().skip(common).collect::<String>().replace('/', ".")
}
