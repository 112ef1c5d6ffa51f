//! Symbian application UID newtype.
//!
//! A UID is a 32-bit value written as `0x` followed by exactly eight hex
//! digits (either case). It is either passed explicitly or declared in the
//! entry script with a `SYMBIAN_UID = 0x........` assignment.

use crate::error::{PackagerError, Result};
use camino::Utf8Path;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Number of hex digits following the `0x` prefix.
const HEX_DIGITS: usize = 8;

static UID_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"SYMBIAN_UID\s*=\s*(0x[0-9a-fA-F]{8})").expect("SYMBIAN_UID pattern is valid")
});

/// A validated Symbian application UID.
///
/// # Examples
///
/// ```
/// use sispack::uid::Uid;
///
/// let uid: Uid = "0x01234ABC".parse().unwrap();
/// assert_eq!(uid.value(), 0x0123_4abc);
/// assert_eq!(uid.to_string(), "0x01234abc");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(u32);

impl Uid {
    /// Wrap a raw 32-bit value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Parse `0x` plus eight hex digits; the prefix is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::InvalidIdentifier`] for anything else,
    /// including surrounding whitespace.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || PackagerError::InvalidIdentifier {
            value: text.to_owned(),
        };

        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .ok_or_else(invalid)?;
        if digits.len() != HEX_DIGITS || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        u32::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| invalid())
    }

    /// Return the raw value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Encode the value as four little-endian bytes.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl FromStr for Uid {
    type Err = PackagerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Uid> for u32 {
    fn from(uid: Uid) -> Self {
        uid.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Find the `SYMBIAN_UID` literal declared in a script, if any.
///
/// Only the literal text is returned; validation happens in [`Uid::parse`].
#[must_use]
pub fn find_declared_uid(script_text: &str) -> Option<&str> {
    UID_MARKER
        .captures(script_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Resolve the UID for a packaging run.
///
/// An explicit value wins; otherwise the entry script is searched for the
/// `SYMBIAN_UID` marker. `script_path` only labels the error.
///
/// # Errors
///
/// Returns [`PackagerError::MissingIdentifier`] when neither source yields a
/// value, or [`PackagerError::InvalidIdentifier`] when the value is malformed.
pub fn resolve_identifier(
    explicit: Option<&str>,
    script_text: &str,
    script_path: &Utf8Path,
) -> Result<Uid> {
    if let Some(value) = explicit {
        return Uid::parse(value);
    }

    let declared =
        find_declared_uid(script_text).ok_or_else(|| PackagerError::MissingIdentifier {
            script: script_path.to_owned(),
        })?;
    log::debug!("using SYMBIAN_UID {declared} declared in {script_path}");
    Uid::parse(declared)
}
