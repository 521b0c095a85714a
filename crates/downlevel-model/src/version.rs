//! Management model versions
//!
//! A [`ModelVersion`] identifies one generation of a component's management
//! schema. Ordering is lexicographic over (major, minor, micro), which is
//! what the transformer registry relies on when selecting a chain for a
//! negotiated peer version.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A totally ordered (major, minor, micro) model version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelVersion {
    major: u32,
    minor: u32,
    micro: u32,
}

impl ModelVersion {
    /// Create a version from its components
    #[inline]
    #[must_use]
    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }

    /// Major component
    #[inline]
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Minor component
    #[inline]
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// Micro component
    #[inline]
    #[must_use]
    pub const fn micro(&self) -> u32 {
        self.micro
    }
}

impl Display for ModelVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

impl FromStr for ModelVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '.');
        let mut component = |required: bool| -> Result<u32, VersionError> {
            match parts.next() {
                Some(part) => part
                    .parse()
                    .map_err(|_| VersionError::Invalid(s.to_string())),
                None if required => Err(VersionError::Invalid(s.to_string())),
                None => Ok(0),
            }
        };
        let major = component(true)?;
        let minor = component(false)?;
        let micro = component(false)?;
        Ok(Self::new(major, minor, micro))
    }
}

/// Errors related to model versions
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    /// Not a `major[.minor[.micro]]` version string
    #[error("invalid model version: {0}")]
    Invalid(String),
}
