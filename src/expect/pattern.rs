//! Named patterns and match results

use crate::error::Result;
use regex::Regex;

/// A compiled regular expression with a human-readable name.
///
/// The name shows up in timeout errors when nothing more specific
/// is available, so keep it short (a prompt or field label).
#[derive(Debug, Clone)]
pub struct Pattern {
    name: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            regex: Regex::new(pattern)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Locate the first match in `text`.
    pub(crate) fn locate(&self, text: &str) -> Option<Located> {
        let caps = self.regex.captures(text)?;
        let whole = caps.get(0)?;
        let captures = caps
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect();

        Some(Located {
            start: whole.start(),
            end: whole.end(),
            captures,
        })
    }

    /// Offset of the first match in `text`, if any
    pub(crate) fn find_start(&self, text: &str) -> Option<usize> {
        self.regex.find(text).map(|m| m.start())
    }
}

/// Raw match position inside the expect buffer
#[derive(Debug, Clone)]
pub(crate) struct Located {
    pub start: usize,
    pub end: usize,
    pub captures: Vec<String>,
}

/// Result of a satisfied expectation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Capture groups, excluding the whole match. Groups that did not
    /// participate are empty strings.
    pub captures: Vec<String>,
    /// Text that preceded the match
    pub before: String,
    /// Everything removed from the buffer: `before` plus the matched text
    pub consumed: String,
}

impl Match {
    /// Capture group `index` (0 = first parenthesised group)
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures.get(index).map(String::as_str)
    }

    /// The matched text alone
    pub fn matched(&self) -> &str {
        self.consumed.get(self.before.len()..).unwrap_or("")
    }
}
