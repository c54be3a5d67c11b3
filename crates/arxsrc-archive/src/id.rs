//! arXiv identifiers (`YYMM.NNNNN`)

use std::fmt;
use std::str::FromStr;

use crate::error::ArchiveError;

/// A validated new-style arXiv identifier, e.g. `2101.00001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArxivId(String);

impl ArxivId {
    /// Parse an identifier of the exact form `\d{4}\.\d{5}`.
    pub fn parse(s: &str) -> Result<Self, ArchiveError> {
        if is_canonical(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ArchiveError::UnsupportedId { id: s.to_string() })
        }
    }

    /// Year-month partition key, e.g. `"2101"`.
    pub fn yymm(&self) -> &str {
        &self.0[..4]
    }

    /// Sequence number within the month, e.g. `1` for `2101.00001`.
    pub fn number(&self) -> u32 {
        // Five ASCII digits always fit
        self.0[5..].parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_canonical(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'.'
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[5..].iter().all(u8::is_ascii_digit)
}

/// Numeric suffix of a manifest bound such as `first_item`.
///
/// Older months use four-digit suffixes (`0801.0001`), so only the
/// dot and an all-digit suffix are required.
pub(crate) fn bound_number(item: &str) -> Option<u32> {
    let (_, suffix) = item.trim().split_once('.')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

impl FromStr for ArxivId {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ArxivId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArxivId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
