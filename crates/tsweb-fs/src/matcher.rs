//! Glob pattern matching capability.

use glob::{MatchOptions, Pattern};

use crate::error::HostError;

/// Decides whether a candidate path matches a glob pattern.
pub trait PatternMatcher: Send + Sync {
    fn matches(&self, candidate: &str, pattern: &str) -> Result<bool, HostError>;
}

/// [`PatternMatcher`] on the `glob` crate.
///
/// `*` and `?` stay within one path segment, `**` spans segments, and a
/// leading dot needs no literal match.
#[derive(Debug, Clone, Copy)]
pub struct GlobMatcher {
    options: MatchOptions,
}

impl GlobMatcher {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            options: MatchOptions {
                case_sensitive,
                require_literal_separator: true,
                require_literal_leading_dot: false,
            },
        }
    }
}

impl Default for GlobMatcher {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PatternMatcher for GlobMatcher {
    fn matches(&self, candidate: &str, pattern: &str) -> Result<bool, HostError> {
        let compiled = Pattern::new(pattern).map_err(|e| HostError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.msg.to_string(),
        })?;
        Ok(compiled.matches_with(candidate, self.options))
    }
}
