//! Targeting options

use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable enabling case-insensitive matching.
pub const IGNORE_CASE_ENV: &str = "ARMATURE_TARGETING_IGNORE_CASE";

/// Options shared by the evaluator and the allocator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingOptions {
    /// Compare user ids and group names case-insensitively
    pub ignore_case: bool,
}

impl TargetingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Read options from the environment.
    ///
    /// `ARMATURE_TARGETING_IGNORE_CASE=1|true` enables case-insensitive matching.
    pub fn from_env() -> Self {
        let ignore_case = env::var(IGNORE_CASE_ENV)
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        Self { ignore_case }
    }

    /// Normalize an identifier for comparison and hashing
    pub(crate) fn normalize<'a>(&self, value: &'a str) -> std::borrow::Cow<'a, str> {
        if self.ignore_case {
            std::borrow::Cow::Owned(value.to_lowercase())
        } else {
            std::borrow::Cow::Borrowed(value)
        }
    }

    /// Compare `candidate` with a `needle` already passed through `normalize`
    pub(crate) fn matches_normalized(&self, candidate: &str, needle: &str) -> bool {
        if self.ignore_case {
            candidate.to_lowercase() == needle
        } else {
            candidate == needle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_case_sensitive() {
        let options = TargetingOptions::default();

        assert!(!options.ignore_case);
        assert!(options.matches_normalized("Alice", &options.normalize("Alice")));
        assert!(!options.matches_normalized("Alice", &options.normalize("alice")));
        assert_eq!(options.normalize("Alice"), "Alice");
    }

    #[test]
    fn test_ignore_case() {
        let options = TargetingOptions::new().with_ignore_case(true);

        assert!(options.matches_normalized("Alice", &options.normalize("aLICE")));
        assert!(!options.matches_normalized("Alicia", &options.normalize("alice")));
        assert_eq!(options.normalize("Ring1"), "ring1");
    }

    #[test]
    fn test_from_env() {
        unsafe {
            env::set_var(IGNORE_CASE_ENV, "true");
        }
        assert!(TargetingOptions::from_env().ignore_case);

        unsafe {
            env::set_var(IGNORE_CASE_ENV, "0");
        }
        assert!(!TargetingOptions::from_env().ignore_case);

        unsafe {
            env::remove_var(IGNORE_CASE_ENV);
        }
        assert!(!TargetingOptions::from_env().ignore_case);
    }
}
