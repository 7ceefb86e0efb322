//! Version validation for operator-entered release versions

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Result, VersionError};

/// MAJOR.MINOR.PATCH with an optional `-<identifier>.<number>` suffix.
const VERSION_PATTERN: &str = r"^[0-9]+\.[0-9]+\.[0-9]+(-[A-Za-z0-9_]+\.[0-9]+)?$";

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_PATTERN).expect("version pattern is valid"))
}

/// Whether `input` has the accepted release version shape
pub fn is_valid_version(input: &str) -> bool {
    version_regex().is_match(input)
}

/// Validate an entered version and return it without surrounding whitespace
pub fn validate_version(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if !is_valid_version(trimmed) {
        return Err(VersionError::InvalidFormat(trimmed.to_string()).into());
    }
    debug!(version = trimmed, "version shape accepted");
    Ok(trimmed.to_string())
}

/// Require `new` to be strictly greater than `current`.
///
/// Only enforced when both parse as semver; the registry has the final say
/// for anything else.
pub fn ensure_version_increases(new: &str, current: &str) -> Result<()> {
    let (Ok(new_v), Ok(current_v)) = (
        semver::Version::parse(new),
        semver::Version::parse(current.trim()),
    ) else {
        debug!(new, current, "skipping version ordering check");
        return Ok(());
    };

    if new_v <= current_v {
        return Err(VersionError::NotGreater {
            new: new.to_string(),
            current: current.trim().to_string(),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExpoInjectError;

    #[test]
    fn test_accepts_release_and_prerelease() {
        assert!(is_valid_version("1.2.3"));
        assert!(is_valid_version("1.2.3-beta.1"));
        assert!(is_valid_version("10.0.12-rc_2.0"));
    }

    #[test]
    fn test_rejects_malformed() {
        for input in ["1.2", "v1.2.3", "1.2.3.4", "", "1.2.3-beta", "1.2.3-beta.x"] {
            assert!(!is_valid_version(input), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_validate_trims_input() {
        assert_eq!(validate_version(" 2.0.0\n").unwrap(), "2.0.0");
    }

    #[test]
    fn test_validate_reports_invalid_version() {
        let err = validate_version("1.2").unwrap_err();
        assert!(matches!(
            err,
            ExpoInjectError::Version(VersionError::InvalidFormat(ref v)) if v == "1.2"
        ));
        assert!(err.to_string().starts_with("Invalid version"));
    }

    #[test]
    fn test_version_must_increase() {
        assert!(ensure_version_increases("1.0.1", "1.0.0\n").is_ok());
        assert!(ensure_version_increases("1.1.0-beta.1", "1.0.9").is_ok());
        assert!(ensure_version_increases("1.0.0", "1.0.0").is_err());
        assert!(ensure_version_increases("0.9.0", "1.0.0").is_err());
    }

    #[test]
    fn test_ordering_skipped_for_non_semver() {
        // `_` is accepted by the shape check but is not a semver identifier
        assert!(ensure_version_increases("1.0.0-rc_1.1", "2.0.0").is_ok());
    }
}
