//! Release tag classification and dependency constraints.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sonic_rs::{JsonValueTrait, Value};
use std::fmt;

static RELEASE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v[0-9]+\.[0-9]+\.[0-9]+$").expect("invalid release tag regex"));

/// Check whether a tag names a release: `v` followed by exactly three
/// dot-separated non-negative integers (`v1.2.3`).
///
/// Branch names, prereleases (`v1.2.3-beta`) and partial versions (`v1.2`)
/// are rejected.
#[must_use]
pub fn is_valid_version(tag: &str) -> bool {
    RELEASE_TAG.is_match(tag)
}

/// Version constraint on a dependency, kept verbatim.
///
/// Usually a string such as `">=v1.0.0"`, but any JSON value a release
/// declares is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionConstraint {
    raw: Value,
}

impl VersionConstraint {
    /// Create from a raw constraint.
    #[must_use]
    pub fn new(constraint: impl Into<Value>) -> Self {
        Self {
            raw: constraint.into(),
        }
    }

    /// The constraint when it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.raw.as_str()
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw.as_str() {
            Some(raw) => f.write_str(raw),
            None => write!(f, "{}", self.raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_release_tags() {
        assert!(is_valid_version("v1.2.3"));
        assert!(is_valid_version("v0.0.0"));
        assert!(is_valid_version("v10.20.300"));
    }

    #[test]
    fn rejects_partial_versions() {
        assert!(!is_valid_version("v1.2"));
        assert!(!is_valid_version("v1"));
        assert!(!is_valid_version("v1.2.3.4"));
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(!is_valid_version("1.2.3"));
        assert!(!is_valid_version("V1.2.3"));
    }

    #[test]
    fn rejects_prereleases_and_branches() {
        assert!(!is_valid_version("v1.2.3-beta"));
        assert!(!is_valid_version("v1.2.3+build"));
        assert!(!is_valid_version("main"));
        assert!(!is_valid_version(""));
        assert!(!is_valid_version(" v1.2.3"));
        assert!(!is_valid_version("v1.2.3\n"));
    }

    #[test]
    fn constraint_is_transparent() {
        let c: VersionConstraint = sonic_rs::from_str(r#"">=1.0""#).unwrap();
        assert_eq!(c.as_str(), Some(">=1.0"));
        assert_eq!(c.to_string(), ">=1.0");
        assert_eq!(sonic_rs::to_string(&c).unwrap(), r#"">=1.0""#);
    }

    #[test]
    fn non_string_constraint_is_kept() {
        let c: VersionConstraint = sonic_rs::from_str(r#"{"min":"v1.0.0"}"#).unwrap();
        assert_eq!(c.as_str(), None);
        assert_eq!(sonic_rs::to_string(&c).unwrap(), r#"{"min":"v1.0.0"}"#);
        assert_eq!(VersionConstraint::new(">=v2.0.0").as_str(), Some(">=v2.0.0"));
    }
}
