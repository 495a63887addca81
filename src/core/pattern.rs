//! Wildcard patterns over subject identifiers
//!
//! A pattern is a literal subject identifier in which every [`WILDCARD`]
//! matches any run of characters (including none). Everything else matches
//! itself, case-sensitively, and the whole identifier must match.

use crate::error::{CacheError, Result};
use regex::Regex;

/// Glob token that turns a lookup key into a pattern
pub const WILDCARD: &str = "*";

/// Compiled subject pattern
#[derive(Debug, Clone)]
pub struct SubjectPattern {
    source: String,
    regex: Regex,
}

impl SubjectPattern {
    /// Compile a glob-style pattern
    ///
    /// # Examples
    ///
    /// ```
    /// use identity_cache::SubjectPattern;
    ///
    /// let pattern = SubjectPattern::compile("alic*").unwrap();
    /// assert!(pattern.matches("alice"));
    /// assert!(pattern.matches("alicia"));
    /// assert!(!pattern.matches("Alice"));
    /// assert!(!pattern.matches("malice"));
    /// ```
    pub fn compile(pattern: &str) -> Result<Self> {
        let body = pattern
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        // `*` also matches newlines
        let regex = Regex::new(&format!("(?s)^{}$", body)).map_err(|source| {
            CacheError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(SubjectPattern {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Check whether a subject identifier matches in full
    pub fn matches(&self, subject_id: &str) -> bool {
        self.regex.is_match(subject_id)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if the lookup key should be treated as a pattern
    pub fn is_pattern(key: &str) -> bool {
        key.contains(WILDCARD)
    }
}
