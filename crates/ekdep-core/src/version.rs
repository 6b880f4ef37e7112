//! Semantic version parsing and ordering for ekdep packages.
//!
//! Versions take the form `major.minor.patch[-feature]-build`:
//! - `major`, `minor`, `patch` and `build` are unsigned integers
//! - `feature` is an optional branch name that starts with a letter,
//!   followed by letters, digits or underscores
//!
//! Ordering compares `major`, `minor` and `patch` numerically. On a tie a
//! mainline version (no feature) sorts above any feature build; two feature
//! builds compare by feature name and then by build number.

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// An increment would take a version component past `u32::MAX`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot increment {part} version {value}: it is already the largest supported")]
pub struct VersionOverflow {
    pub part: &'static str,
    pub value: u32,
}

/// A parsed `major.minor.patch[-feature]-build` version.
///
/// Parsing never fails: unparsable text produces a value with
/// [`SemanticVersion::is_valid`] returning `false` and every field zeroed.
#[derive(Debug, Clone, Default)]
pub struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
    feature: Option<String>,
    build: u32,
    valid: bool,
}

impl SemanticVersion {
    /// Parse `major.minor.patch[-feature]-build`.
    pub fn parse(text: &str) -> Self {
        let Some((head, build)) = text.rsplit_once('-') else {
            return Self::invalid();
        };
        match (Self::parse_without_build(head), parse_number(build)) {
            (v, Some(build)) if v.valid => Self { build, ..v },
            _ => Self::invalid(),
        }
    }

    /// Parse `major.minor.patch[-feature]` with the build number set to zero.
    ///
    /// Used when a release is being set explicitly and the build number is
    /// about to be assigned fresh.
    pub fn parse_without_build(text: &str) -> Self {
        let (core, feature) = match text.split_once('-') {
            Some((core, feature)) => {
                if !is_feature_name(feature) {
                    return Self::invalid();
                }
                (core, Some(feature.to_string()))
            }
            None => (text, None),
        };

        let mut parts = core.split('.');
        let (Some(major), Some(minor), Some(patch), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Self::invalid();
        };

        match (parse_number(major), parse_number(minor), parse_number(patch)) {
            (Some(major), Some(minor), Some(patch)) => Self {
                major,
                minor,
                patch,
                feature,
                build: 0,
                valid: true,
            },
            _ => Self::invalid(),
        }
    }

    fn invalid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn patch(&self) -> u32 {
        self.patch
    }

    pub fn feature(&self) -> Option<&str> {
        self.feature.as_deref()
    }

    pub fn build(&self) -> u32 {
        self.build
    }

    /// Bump the major number, resetting minor, patch and build.
    ///
    /// Leaves the version untouched on overflow.
    pub fn increment_major(&mut self) -> Result<(), VersionOverflow> {
        self.major = bump("major", self.major)?;
        self.minor = 0;
        self.patch = 0;
        self.build = 0;
        Ok(())
    }

    /// Bump the minor number, resetting patch and build.
    pub fn increment_minor(&mut self) -> Result<(), VersionOverflow> {
        self.minor = bump("minor", self.minor)?;
        self.patch = 0;
        self.build = 0;
        Ok(())
    }

    /// Bump the patch number, resetting build.
    pub fn increment_patch(&mut self) -> Result<(), VersionOverflow> {
        self.patch = bump("patch", self.patch)?;
        self.build = 0;
        Ok(())
    }

    pub fn increment_build(&mut self) -> Result<(), VersionOverflow> {
        self.build = bump("build", self.build)?;
        Ok(())
    }
}

fn bump(part: &'static str, value: u32) -> Result<u32, VersionOverflow> {
    value.checked_add(1).ok_or(VersionOverflow { part, value })
}

fn parse_number(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn is_feature_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(feature) = &self.feature {
            write!(f, "-{feature}")?;
        }
        write!(f, "-{}", self.build)
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.feature, &other.feature) {
                (None, None) => Ordering::Equal,
                // Feature branches rank below the mainline release.
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            })
            .then(self.build.cmp(&other.build))
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
