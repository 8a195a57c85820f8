//! Integer versions of the form `MAJOR[.MINOR[.PATCH]]`.
//!
//! Major-version suffixed import paths (`gopkg.in/yaml.v2`) are resolved against remote
//! branches and tags named `v1`, `v1.2` or `v1.2.3`. These are not full semantic versions:
//! minor and patch are optional, and a version without a minor sorts below any version of
//! the same major that has one (`1 < 1.0 < 1.0.0 < 1.1`).

use std::fmt;
use std::str::FromStr;

use crate::core::GopmError;

/// Components are limited to nine digits.
const MAX_COMPONENT_DIGITS: usize = 9;

/// A version made of up to three non-negative integers.
///
/// Ordering is major first, then minor, then patch, with an absent component ordering
/// before any present one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntegerVersion {
    major: u32,
    minor: Option<u32>,
    patch: Option<u32>,
}

impl IntegerVersion {
    /// Builds a version from its parts. A patch without a minor is rejected.
    pub fn new(major: u32, minor: Option<u32>, patch: Option<u32>) -> Result<Self, GopmError> {
        if minor.is_none() && patch.is_some() {
            return Err(GopmError::InvalidVersion {
                value: format!("{major}..{}", patch.unwrap_or_default()),
            });
        }
        Ok(Self {
            major,
            minor,
            patch,
        })
    }

    /// The major component.
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// The minor component, if present.
    pub const fn minor(&self) -> Option<u32> {
        self.minor
    }

    /// The patch component, if present.
    pub const fn patch(&self) -> Option<u32> {
        self.patch
    }
}

impl FromStr for IntegerVersion {
    type Err = GopmError;

    fn from_str(plain: &str) -> Result<Self, Self::Err> {
        let invalid = || GopmError::InvalidVersion {
            value: plain.to_string(),
        };
        let mut components = Vec::with_capacity(3);
        for part in plain.split('.') {
            if part.is_empty()
                || part.len() > MAX_COMPONENT_DIGITS
                || !part.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(invalid());
            }
            components.push(part.parse::<u32>().map_err(|_| invalid())?);
        }
        match components.as_slice() {
            [major] => Self::new(*major, None, None),
            [major, minor] => Self::new(*major, Some(*minor), None),
            [major, minor, patch] => Self::new(*major, Some(*minor), Some(*patch)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for IntegerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{minor}")?;
            if let Some(patch) = self.patch {
                write!(f, ".{patch}")?;
            }
        }
        Ok(())
    }
}
