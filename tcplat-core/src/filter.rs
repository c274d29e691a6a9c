//! Raw frame byte filter.
//!
//! A filter is a list of `OFFSET:VALUE` conditions on the frame bytes as
//! captured (link-layer header included). A frame passes when every listed
//! offset exists and holds the given value; the empty filter passes all.

use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;

/// One `OFFSET:VALUE` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteMatch {
    pub offset: usize,
    pub value: u8,
}

impl ByteMatch {
    pub fn new(offset: usize, value: u8) -> Self {
        Self { offset, value }
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        data.get(self.offset) == Some(&self.value)
    }
}

impl FromStr for ByteMatch {
    type Err = FilterError;

    /// Parse `OFFSET:VALUE`; either side may be decimal or `0x` hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (offset, value) = s
            .split_once(':')
            .ok_or_else(|| FilterError::MissingSeparator(s.to_string()))?;

        let offset = parse_number(offset.trim())
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| FilterError::InvalidOffset(offset.to_string()))?;
        let value = parse_number(value.trim())
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(|| FilterError::InvalidValue(value.to_string()))?;

        Ok(Self { offset, value })
    }
}

impl fmt::Display for ByteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.offset, self.value)
    }
}

fn parse_number(s: &str) -> Option<u64> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

/// Conjunction of byte conditions applied before key extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteFilter {
    conditions: Vec<ByteMatch>,
}

impl ByteFilter {
    pub fn new(conditions: Vec<ByteMatch>) -> Self {
        Self { conditions }
    }

    /// Parse a list of `OFFSET:VALUE` expressions.
    pub fn parse<I, S>(exprs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let conditions = exprs
            .into_iter()
            .map(|expr| expr.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { conditions })
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[ByteMatch] {
        &self.conditions
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        self.conditions.iter().all(|c| c.matches(data))
    }
}

impl FromIterator<ByteMatch> for ByteFilter {
    fn from_iter<T: IntoIterator<Item = ByteMatch>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
