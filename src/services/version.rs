// src/services/version.rs

//! Dotted release versions and their packed ordering key.
//!
//! Versions have two to four numeric components
//! (`major.minor[.build[.revision]]`). The packed key puts each component in
//! its own 16-bit lane so that integer order matches version order:
//!
//! ```text
//! | 0 | major (15) | minor (16) | build (16) | revision (16) |
//! ```
//!
//! Missing components pack as zero, so `1.2` and `1.2.0` share a key. The
//! string form stays the identity of a version; the key only orders it.

use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, Result};

const LANE_BITS: u32 = 16;
const MAX_MAJOR: u32 = (1 << (LANE_BITS - 1)) - 1;
const MAX_COMPONENT: u32 = (1 << LANE_BITS) - 1;

/// A parsed `major.minor[.build[.revision]]` version.
///
/// Ordering matches the usual rules, with an absent component sorting
/// before any present one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

impl Version {
    /// Parse a dotted numeric version.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || AppError::invalid_version(text);

        let parts: Vec<&str> = text.split('.').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(invalid());
        }

        let mut numbers = Vec::with_capacity(parts.len());
        for part in parts {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            numbers.push(part.parse::<u32>().map_err(|_| invalid())?);
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            build: numbers.get(2).copied(),
            revision: numbers.get(3).copied(),
        })
    }

    /// Whether `text` parses and fits the packed encoding.
    pub fn is_valid(text: &str) -> bool {
        Self::parse(text).and_then(|v| v.encode()).is_ok()
    }

    /// Pack into an ordering key.
    ///
    /// Fails when a component does not fit its lane.
    pub fn encode(&self) -> Result<i64> {
        let build = self.build.unwrap_or(0);
        let revision = self.revision.unwrap_or(0);

        if self.major > MAX_MAJOR
            || self.minor > MAX_COMPONENT
            || build > MAX_COMPONENT
            || revision > MAX_COMPONENT
        {
            return Err(AppError::invalid_version(self.to_string()));
        }

        let packed = (i64::from(self.major) << (3 * LANE_BITS))
            | (i64::from(self.minor) << (2 * LANE_BITS))
            | (i64::from(build) << LANE_BITS)
            | i64::from(revision);
        Ok(packed)
    }
}

impl FromStr for Version {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
            if let Some(revision) = self.revision {
                write!(f, ".{revision}")?;
            }
        }
        Ok(())
    }
}
