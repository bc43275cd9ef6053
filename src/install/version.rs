//! Dotted version numbers for the OS version gate.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::InstallerError;

static LEADING_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*v?(\d+(?:\.\d+)*)").expect("version pattern is valid"));

/// A dotted sequence of non-negative integers, e.g. `10.15.7`.
///
/// Ordering is component-wise from the left. When one version is a prefix of
/// the other, the shorter one sorts first (`10.10 < 10.10.0`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OsVersion {
    parts: Vec<u64>,
}

impl OsVersion {
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    /// Parse the leading dotted-number run of a raw version string.
    ///
    /// Trailing build suffixes are ignored, so a kernel release such as
    /// `6.8.0-45-generic` parses as `6.8.0`.
    pub fn parse_lenient(raw: &str) -> Result<Self, InstallerError> {
        let caps = LEADING_VERSION
            .captures(raw)
            .ok_or_else(|| InstallerError::InvalidVersion(raw.to_string()))?;
        caps[1].parse()
    }
}

impl FromStr for OsVersion {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InstallerError::InvalidVersion(s.to_string()));
        }
        let parts = trimmed
            .split('.')
            .map(|p| p.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| InstallerError::InvalidVersion(s.to_string()))?;
        Ok(Self { parts })
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .parts
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> OsVersion {
        s.parse().unwrap()
    }

    #[test]
    fn test_numeric_not_lexical_ordering() {
        assert!(v("10.9") < v("10.10"));
        assert!(v("10.10") < v("10.11"));
        assert!(v("10.9") < v("10.11"));
        assert!(v("11.0") > v("10.15.7"));
    }

    #[test]
    fn test_shorter_prefix_sorts_first() {
        assert!(v("10.10") < v("10.10.0"));
        assert!(v("10.10") < v("10.10.1"));
        assert_eq!(v("10.10"), v("10.10"));
    }

    #[test]
    fn test_rejects_non_numeric_components() {
        assert!("10.x".parse::<OsVersion>().is_err());
        assert!("".parse::<OsVersion>().is_err());
        assert!("10..1".parse::<OsVersion>().is_err());
    }

    #[test]
    fn test_lenient_parse_strips_suffixes() {
        assert_eq!(OsVersion::parse_lenient("6.8.0-45-generic").unwrap(), v("6.8.0"));
        assert_eq!(OsVersion::parse_lenient("14.4.1\n").unwrap(), v("14.4.1"));
        assert!(OsVersion::parse_lenient("unknown").is_err());
    }

    #[test]
    fn test_display_round_trips_components() {
        assert_eq!(v("10.15.7").to_string(), "10.15.7");
        assert_eq!(v("10.15.7").parts(), &[10, 15, 7]);
    }
}
