use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A line terminator style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r`
    Cr,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    pub const ALL: [LineEnding; 3] = [LineEnding::Lf, LineEnding::Cr, LineEnding::CrLf];

    /// The literal terminator text.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// The configuration token (`lf`, `cr`, `crlf`).
    #[inline]
    pub const fn token(self) -> &'static str {
        match self {
            LineEnding::Lf => "lf",
            LineEnding::Cr => "cr",
            LineEnding::CrLf => "crlf",
        }
    }

    /// Parse a configuration token. Tokens are matched exactly.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "lf" => Some(LineEnding::Lf),
            "cr" => Some(LineEnding::Cr),
            "crlf" => Some(LineEnding::CrLf),
            _ => None,
        }
    }

    /// The host platform's native terminator.
    ///
    /// Formatting passes never call this themselves; it is the conventional value for callers to
    /// inject as the fallback for unrecognised `end_of_line` values.
    pub const fn platform() -> Self {
        if cfg!(windows) {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        Self::platform()
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown line ending `{0}` (expected `lf`, `cr` or `crlf`)")]
pub struct ParseLineEndingError(pub String);

impl FromStr for LineEnding {
    type Err = ParseLineEndingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| ParseLineEndingError(s.to_owned()))
    }
}
