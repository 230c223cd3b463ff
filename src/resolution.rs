//! Parsing of `WIDTHxHEIGHT` resolution strings.
//!
//! Every transform entry carries its target size as a raw string such as
//! `"64x64"`. Parsing is kept pure: the only checks are syntactic.
//!
//! - Leading and trailing whitespace is ignored.
//! - The separator is a lowercase `x`, and it must appear exactly once.
//!   A stray trailing separator (`"64x64x"`) is a third, empty part and is
//!   rejected, never collapsed into a valid pair.
//! - Both parts are non-empty runs of ASCII digits that fit in a `u32`.
//!
//! `"0x0"` parses. Range checks belong to the resize step, which refuses
//! zero-sized targets, so a zero dimension surfaces as a per-entry execution
//! failure rather than a validation rejection.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between width and height.
pub const SEPARATOR: char = 'x';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("resolution is empty")]
    Empty,
    #[error("expected WIDTHxHEIGHT, found {parts} part(s) in {raw:?}")]
    WrongPartCount { raw: String, parts: usize },
    #[error("dimension {0:?} is not a decimal number")]
    NonNumeric(String),
}

/// A parsed target size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero. Such a resolution parses but
    /// cannot be rendered.
    pub fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.width, SEPARATOR, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_resolution(s)
    }
}

/// Parse a raw resolution string like `"1920x1080"`.
///
/// - `"16x16"` → `Ok(16x16)`
/// - `" 32x32 "` → `Ok(32x32)`
/// - `""` → `Err(Empty)`
/// - `"64"`, `"64x64x"`, `"1x2x3"` → `Err(WrongPartCount)`
/// - `"x64"`, `"64xabc"`, `"+4x4"` → `Err(NonNumeric)`
pub fn parse_resolution(raw: &str) -> Result<Resolution, ResolutionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ResolutionError::Empty);
    }

    let parts: Vec<&str> = trimmed.split(SEPARATOR).collect();
    let [width, height] = parts.as_slice() else {
        return Err(ResolutionError::WrongPartCount {
            raw: trimmed.to_string(),
            parts: parts.len(),
        });
    };

    Ok(Resolution {
        width: parse_dimension(width)?,
        height: parse_dimension(height)?,
    })
}

fn parse_dimension(part: &str) -> Result<u32, ResolutionError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ResolutionError::NonNumeric(part.to_string()));
    }
    // All digits but too large for u32 is still not a usable number.
    part.parse::<u32>()
        .map_err(|_| ResolutionError::NonNumeric(part.to_string()))
}
