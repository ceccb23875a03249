//! Alias parsing.
//!
//! Marker characters are recognised once here and never re-inspected downstream:
//! a leading `!` means "ignore this alias", a leading `%` (consume only) routes the
//! install into the development dependency section.

use std::fmt;

use crate::error::PackError;

pub const IGNORE_MARKER: char = '!';
pub const DEV_MARKER: char = '%';

/// An alias with its markers stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSpec {
    pub base: String,
    pub ignored: bool,
    pub dev_only: bool,
}

impl AliasSpec {
    /// Parse an alias given to publish. Only the ignore marker is recognised.
    pub fn for_publish(input: &str) -> Result<Self, PackError> {
        let (ignored, base) = match input.strip_prefix(IGNORE_MARKER) {
            Some(rest) => (true, rest),
            None => (false, input),
        };
        Self::build(base, ignored, false)
    }

    /// Parse an alias given to consume, e.g. `%eslint-config` or `!old-lib`.
    pub fn for_consume(input: &str) -> Result<Self, PackError> {
        let (ignored, rest) = match input.strip_prefix(IGNORE_MARKER) {
            Some(rest) => (true, rest),
            None => (false, input),
        };
        let (dev_only, base) = match rest.strip_prefix(DEV_MARKER) {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        Self::build(base, ignored, dev_only)
    }

    fn build(base: &str, ignored: bool, dev_only: bool) -> Result<Self, PackError> {
        // Surrounding whitespace is rejected, not stripped
        if base.trim() != base {
            return Err(PackError::MissingAlias);
        }
        // `!` alone is a valid, ignored alias
        if base.is_empty() && !ignored {
            return Err(PackError::MissingAlias);
        }
        Ok(Self {
            base: base.to_string(),
            ignored,
            dev_only,
        })
    }
}

impl fmt::Display for AliasSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ignored {
            write!(f, "{}", IGNORE_MARKER)?;
        }
        if self.dev_only {
            write!(f, "{}", DEV_MARKER)?;
        }
        write!(f, "{}", self.base)
    }
}
