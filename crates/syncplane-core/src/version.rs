//! Semantic versions for connectors and the sync protocol.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AppError;

/// `major.minor.patch` version as stored for connector images and breaking changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() != 3 {
            return Err(AppError::InvalidVersion(format!(
                "'{}' is not of the form major.minor.patch",
                s
            )));
        }

        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| AppError::InvalidVersion(format!("'{}' has a non-numeric part", s)))
        };

        Ok(Version::new(parse(parts[0])?, parse(parts[1])?, parse(parts[2])?))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Protocol versions spoken between connectors and the platform.
pub struct ProtocolVersion;

impl ProtocolVersion {
    pub const V0: Version = Version::new(0, 2, 0);
    pub const V1: Version = Version::new(1, 0, 0);
    /// Assumed for connector versions stored without a protocol version.
    pub const DEFAULT: Version = Self::V0;

    /// Parses a stored protocol version, falling back to [`ProtocolVersion::DEFAULT`] for NULL.
    pub fn get_with_default(stored: Option<&str>) -> Result<Version, AppError> {
        match stored {
            Some(raw) => raw.parse(),
            None => Ok(Self::DEFAULT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let v: Version = "1.2.3".parse().unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
        assert_eq!(v.to_string(), "1.2.3");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("1.2".parse::<Version>().is_err());
        assert!("1.x.0".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(Version::new(1, 0, 0) > Version::new(0, 9, 9));
        assert!(Version::new(0, 2, 1) > Version::new(0, 2, 0));
    }

    #[test]
    fn test_protocol_version_default() {
        assert_eq!(
            ProtocolVersion::get_with_default(None).unwrap().to_string(),
            "0.2.0"
        );
        assert_eq!(
            ProtocolVersion::get_with_default(Some("1.0.0")).unwrap(),
            ProtocolVersion::V1
        );
        assert!(ProtocolVersion::get_with_default(Some("one")).is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_value(Version::new(0, 3, 1)).unwrap();
        assert_eq!(json, serde_json::json!("0.3.1"));
        let back: Version = serde_json::from_value(json).unwrap();
        assert_eq!(back, Version::new(0, 3, 1));
    }
}
