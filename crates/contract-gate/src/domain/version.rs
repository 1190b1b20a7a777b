//! # Solidity Version Parsing
//!
//! Extracts the lower bound declared by a `pragma solidity` constraint.

use std::fmt;

/// A `major.minor.patch` compiler version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SolidityVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl SolidityVersion {
    /// Lowest compiler version accepted for deployment.
    pub const MINIMUM: Self = Self::new(0, 8, 20);

    /// Creates a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses the lower bound of a constraint such as `^0.8.20`,
    /// `>=0.8.21 <0.9.0` or `0.8.24`.
    ///
    /// Returns `None` when no version number can be read.
    #[must_use]
    pub fn parse_constraint(constraint: &str) -> Option<Self> {
        let first = constraint
            .split("||")
            .next()?
            .split_whitespace()
            .find(|part| !part.starts_with('<'))?;

        let cleaned = first.trim_start_matches(['^', '~', '>', '=', 'v']);

        let mut parts = cleaned.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }

        Some(Self::new(major, minor, patch))
    }

    /// True if this version is at least [`Self::MINIMUM`].
    #[must_use]
    pub fn is_supported(&self) -> bool {
        *self >= Self::MINIMUM
    }
}

impl fmt::Display for SolidityVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
