//! Type-safe wrappers for protocol identifiers
//!
//! Contract names and release versions are plain strings on-chain; these
//! newtypes keep them from being mixed up with each other.

use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A semantic version identifying a protocol release (e.g. "1.0.0", "1.5.0-rc1")
///
/// Releases are totally ordered: numeric components first, then a release
/// candidate sorts before the final release it precedes.
///
/// # Example
///
/// ```ignore
/// let rc: VersionTag = "1.5.0-rc1".parse()?;
/// let final_release: VersionTag = "1.5.0".parse()?;
/// assert!(rc < final_release);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionTag {
    major: u64,
    minor: u64,
    patch: u64,
    pre: Option<String>,
}

impl VersionTag {
    /// Create a release tag without a pre-release suffix
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    /// Parse a version string, accepting an optional leading "v"
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Config` if the string is not `major.minor.patch[-pre]`
    pub fn parse(version: &str) -> Result<Self> {
        let trimmed = version.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let (core, pre) = match trimmed.split_once('-') {
            Some((core, pre)) if !pre.is_empty() => (core, Some(pre.to_string())),
            Some(_) => {
                return Err(RegistryError::Config(format!(
                    "Invalid version '{version}': empty pre-release suffix"
                )));
            }
            None => (trimmed, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(RegistryError::Config(format!(
                "Invalid version '{version}': expected major.minor.patch"
            )));
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                RegistryError::Config(format!(
                    "Invalid version '{version}': '{part}' is not a number"
                ))
            })?;
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre,
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Pre-release suffix, if any (e.g. "rc1")
    pub fn pre_release(&self) -> Option<&str> {
        self.pre.as_deref()
    }
}

impl Ord for VersionTag {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for VersionTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl FromStr for VersionTag {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionTag {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VersionTag> for String {
    fn from(tag: VersionTag) -> Self {
        tag.to_string()
    }
}
