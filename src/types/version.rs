//! Semantic version values with total ordering.
//!
//! Supports:
//! - Full triples: `1.2.3`
//! - Short forms: `2` or `2.1` (missing components are zero)
//! - Prerelease tags: `1.0.0-beta.2`

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("version string is empty")]
    Empty,

    #[error("invalid version component '{0}'")]
    InvalidComponent(String),

    #[error("too many version components in '{0}'")]
    TooManyComponents(String),

    #[error("empty prerelease tag in '{0}'")]
    EmptyPrerelease(String),
}

/// A semantic version: three non-negative integers plus an optional
/// prerelease tag.
///
/// Ordering is lexicographic on (major, minor, patch); a version with a
/// prerelease tag sorts strictly below the same triple without one, and
/// prerelease tags compare lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(into = "String")]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub prerelease: Option<String>,
}

impl SemanticVersion {
    /// Create a release version with no prerelease tag.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Create a version with a prerelease tag.
    pub fn with_prerelease(major: u32, minor: u32, patch: u32, tag: &str) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: Some(tag.to_string()),
        }
    }

    /// Whether this version is strictly newer than `other`.
    pub fn is_newer_than(&self, other: &SemanticVersion) -> bool {
        self > other
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let (core, prerelease) = match s.split_once('-') {
            Some((core, tag)) => {
                if tag.is_empty() {
                    return Err(VersionParseError::EmptyPrerelease(s.to_string()));
                }
                (core, Some(tag.to_string()))
            }
            None => (s, None),
        };

        let mut parts = [0u32; 3];
        let components: Vec<&str> = core.split('.').collect();
        if components.len() > 3 {
            return Err(VersionParseError::TooManyComponents(s.to_string()));
        }
        for (i, component) in components.iter().enumerate() {
            parts[i] = component
                .parse::<u32>()
                .map_err(|_| VersionParseError::InvalidComponent(component.to_string()))?;
        }

        Ok(Self {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
            prerelease,
        })
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(tag) = &self.prerelease {
            write!(f, "-{tag}")?;
        }
        Ok(())
    }
}

impl From<SemanticVersion> for String {
    fn from(v: SemanticVersion) -> Self {
        v.to_string()
    }
}

impl<'de> serde::Deserialize<'de> for SemanticVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
