use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity of a log event.
///
/// Variants are listed in declaration order, which is the only ordering the
/// facade recognizes. Sinks never filter by threshold; see [`LevelSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown severity: {0}")]
pub struct UnknownSeverity(pub String);

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
    ];

    /// Lowest recognized severity. Every sink uses it as its watermark, so the
    /// watermark itself never rejects an event.
    pub const MIN: Severity = Severity::Trace;

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }

    /// Numeric value carried on the wire (10 for trace up to 50 for error).
    pub fn value(self) -> u8 {
        match self {
            Severity::Trace => 10,
            Severity::Debug => 20,
            Severity::Info => 30,
            Severity::Warn => 40,
            Severity::Error => 50,
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.value() == value)
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| UnknownSeverity(s.to_string()))
    }
}

/// `level` as written in configuration: a single severity or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelSpec {
    One(Severity),
    Many(Vec<Severity>),
}

impl LevelSpec {
    /// Canonical set form. A scalar becomes a one-element set.
    pub fn normalize(&self) -> LevelSet {
        match self {
            LevelSpec::One(level) => LevelSet::empty().with(*level),
            LevelSpec::Many(levels) => levels.iter().copied().collect(),
        }
    }
}

impl From<Severity> for LevelSpec {
    fn from(level: Severity) -> Self {
        LevelSpec::One(level)
    }
}

impl From<Vec<Severity>> for LevelSpec {
    fn from(levels: Vec<Severity>) -> Self {
        LevelSpec::Many(levels)
    }
}

/// Set of severities a sink accepts.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LevelSet(u8);

impl LevelSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Severity::ALL.into_iter().collect()
    }

    pub fn with(mut self, level: Severity) -> Self {
        self.insert(level);
        self
    }

    pub fn insert(&mut self, level: Severity) {
        self.0 |= level.bit();
    }

    pub fn contains(&self, level: Severity) -> bool {
        self.0 & level.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Severity> + '_ {
        Severity::ALL.into_iter().filter(|s| self.contains(*s))
    }
}

impl FromIterator<Severity> for LevelSet {
    fn from_iter<I: IntoIterator<Item = Severity>>(iter: I) -> Self {
        let mut set = LevelSet::empty();
        for level in iter {
            set.insert(level);
        }
        set
    }
}

impl From<&LevelSpec> for LevelSet {
    fn from(spec: &LevelSpec) -> Self {
        spec.normalize()
    }
}

impl fmt::Debug for LevelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// True iff `level` is a member of `allowed` once normalized to a set.
///
/// There is no threshold semantics: a sink allowing only `error` never
/// receives `info`.
pub fn is_allowed(level: Severity, allowed: &LevelSpec) -> bool {
    allowed.normalize().contains(level)
}
