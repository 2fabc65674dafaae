use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{go, python};
use crate::error::ConfigError;
use crate::lang::Language;

/// How much of an error trace survives normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Verbosity {
    /// Only the final summary line of a trace is kept.
    Minimal = 0,
    /// The trace is replaced by a fixed placeholder.
    Elided = 1,
    /// Traces are left alone.
    Verbatim = 2,
}

impl TryFrom<i64> for Verbosity {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        use Verbosity::*;
        match value {
            0 => Ok(Minimal),
            1 => Ok(Elided),
            2 => Ok(Verbatim),
            _ => Err(ConfigError::InvalidVerbosity(value)),
        }
    }
}

impl From<Verbosity> for i64 {
    fn from(v: Verbosity) -> Self {
        v as i64
    }
}

impl FromStr for Verbosity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: i64 = s
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVerbosityString(s.to_owned()))?;
        Self::try_from(n)
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as i64)
    }
}

/// Canonical form of `raw` for comparison. Trailing newlines are kept as printed.
pub fn normalise(language: Language, raw: &str, verbosity: Verbosity) -> String {
    use Language::*;
    match language {
        Python => python::normalise(raw, verbosity),
        Go => go::normalise(raw, verbosity),
        Node | Ruby | Rust => raw.to_owned(),
    }
}
