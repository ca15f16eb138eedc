//! Version families and roll-forward selection
//!
//! A runtime and its SDK are versioned in lockstep at the `major.minor` level, so the
//! SDK is requested as a wildcard family (`6.0.*`) derived from the runtime version.
//! When a fixed catalog of concrete versions is available, [`roll_forward`] picks the
//! one the .NET host would pick: never cross a major, prefer the same minor, move
//! patches up never down, and fall through to the next minor line when needed.

use crate::error::{Error, Result};
use semver::Version;

pub const WILDCARD: &str = "*";

/// Wildcard family of a dot-separated version.
///
/// - `"2.1.5"` -> `"2.1.*"`
/// - `"6.0"` -> `"6.0.*"`
/// - `"6"` -> `"6.*"`
/// - `""` -> `"*"`
pub fn wildcard_family(version: &str) -> String {
    let version = version.trim();
    if version.is_empty() {
        return WILDCARD.to_string();
    }

    let mut parts: Vec<&str> = version.split('.').collect();
    if parts.len() < 3 {
        parts.push(WILDCARD);
    } else if let Some(last) = parts.last_mut() {
        *last = WILDCARD;
    }

    let first_wildcard = parts
        .iter()
        .position(|p| *p == WILDCARD)
        .unwrap_or(parts.len() - 1);
    parts.truncate(first_wildcard + 1);

    parts.join(".")
}

/// True when the string contains a wildcard component
pub fn is_wildcard(version: &str) -> bool {
    version.split('.').any(|p| p == WILDCARD)
}

/// Parses `major[.minor[.patch]]`, padding missing components with zero
pub fn parse_version(version: &str) -> Result<Version> {
    let trimmed = version.trim();
    let padded = match trimmed.split('.').count() {
        1 => format!("{trimmed}.0.0"),
        2 => format!("{trimmed}.0"),
        _ => trimmed.to_string(),
    };

    Version::parse(&padded).map_err(|source| Error::InvalidVersion {
        version: version.to_string(),
        source,
    })
}

/// Selects the compatible candidate for `requested` from `available`.
///
/// With `apply_patches == false` an exact match is kept as is. Otherwise the highest
/// patch at or above the requested one on the same minor wins; when that minor is
/// exhausted the smallest greater minor's highest patch is used.
pub fn roll_forward(
    requested: &Version,
    available: &[Version],
    apply_patches: bool,
) -> Result<Version> {
    let same_major: Vec<&Version> = available
        .iter()
        .filter(|v| v.major == requested.major)
        .collect();

    if same_major.is_empty() {
        return Err(Error::NoCompatibleVersion {
            requested: requested.to_string(),
        });
    }

    if !apply_patches && same_major.iter().any(|v| *v == requested) {
        return Ok(requested.clone());
    }

    let same_minor_patch = same_major
        .iter()
        .filter(|v| v.minor == requested.minor && v.patch >= requested.patch)
        .max();
    if let Some(version) = same_minor_patch {
        return Ok((*version).clone());
    }

    let next_minor = same_major
        .iter()
        .filter(|v| v.minor > requested.minor)
        .map(|v| v.minor)
        .min();

    match next_minor {
        Some(minor) => same_major
            .iter()
            .filter(|v| v.minor == minor)
            .max()
            .map(|v| (*v).clone())
            .ok_or_else(|| Error::NoCompatibleVersion {
                requested: requested.to_string(),
            }),
        None => Err(Error::NoCompatibleVersion {
            requested: requested.to_string(),
        }),
    }
}

/// Checks that a pinned version can serve an app built against `runtime`.
///
/// Majors must be equal and the pinned minor must not be lower than the runtime's.
/// `requested` may be a family such as `2.1.*`; a wildcard major or minor is unconstrained.
pub fn check_compatible(runtime: &str, requested: &str) -> Result<()> {
    let incompatible = |reason: &str| Error::IncompatibleVersion {
        requested: requested.to_string(),
        runtime: runtime.to_string(),
        reason: reason.to_string(),
    };

    let mut components = requested.trim().split('.');
    let major_wildcard = components.next() == Some(WILDCARD);
    let minor_wildcard = components.next() == Some(WILDCARD);
    if major_wildcard {
        return Ok(());
    }

    let runtime_version = parse_version(&runtime.replace(WILDCARD, "0"))?;
    let requested_version = parse_version(&requested.replace(WILDCARD, "0"))?;

    if runtime_version.major != requested_version.major {
        return Err(incompatible(
            "major versions of runtimes do not match between buildpack.yml and runtimeconfig.json",
        ));
    }

    if !minor_wildcard && runtime_version.minor > requested_version.minor {
        return Err(incompatible(
            "the minor version of the runtimeconfig.json is greater than the minor version of the buildpack.yml",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn versions(list: &[&str]) -> Vec<Version> {
        list.iter().map(|v| Version::parse(v).unwrap()).collect()
    }

    #[parameterized(
        full = { "2.1.5", "2.1.*" },
        major_minor = { "6.0", "6.0.*" },
        major_only = { "6", "6.*" },
        empty = { "", "*" },
        already_family = { "2.1.*", "2.1.*" },
        major_family = { "6.*", "6.*" },
        inner_wildcard = { "2.*.3", "2.*" },
        four_components = { "1.2.3.4", "1.2.3.*" },
    )]
    fn test_wildcard_family(input: &str, expected: &str) {
        assert_eq!(wildcard_family(input), expected);
    }

    #[parameterized(
        three = { "2.1.5" },
        two = { "6.0" },
        one = { "6" },
        ten = { "10.0.100" },
    )]
    fn test_wildcard_family_properties(version: &str) {
        let family = wildcard_family(version);
        assert!(family.ends_with(".*"));

        let prefix = family.trim_end_matches('*');
        let padded = format!("{version}.*");
        assert!(version.starts_with(prefix) || padded.starts_with(prefix));

        assert_eq!(wildcard_family(&family), family);
    }

    #[test]
    fn test_is_wildcard() {
        assert!(is_wildcard("*"));
        assert!(is_wildcard("2.1.*"));
        assert!(!is_wildcard("2.1.5"));
    }

    #[test]
    fn test_parse_version_pads() {
        assert_eq!(parse_version("6").unwrap(), Version::new(6, 0, 0));
        assert_eq!(parse_version("6.1").unwrap(), Version::new(6, 1, 0));
        assert_eq!(parse_version("6.1.4").unwrap(), Version::new(6, 1, 4));
        assert!(matches!(
            parse_version("six"),
            Err(Error::InvalidVersion { .. })
        ));
    }

    #[parameterized(
        exact_present = { "2.2.5", false, "2.2.5" },
        patch_rolls_up = { "2.2.0", false, "2.2.5" },
        minor_rolls_forward = { "2.1.0", false, "2.2.5" },
        patch_above_available_moves_minor = { "2.2.6", false, "2.3.0" },
        apply_patches_moves_exact = { "2.2.4", true, "2.2.5" },
    )]
    fn test_roll_forward(requested: &str, apply_patches: bool, expected: &str) {
        let available = versions(&["2.2.4", "2.2.5", "2.3.0"]);
        let requested = Version::parse(requested).unwrap();

        let selected = roll_forward(&requested, &available, apply_patches).unwrap();
        assert_eq!(selected, Version::parse(expected).unwrap());
    }

    #[test]
    fn test_roll_forward_exact_kept_without_patches() {
        let available = versions(&["2.2.4", "2.2.5", "2.3.0"]);
        let requested = Version::new(2, 2, 4);

        let selected = roll_forward(&requested, &available, false).unwrap();
        assert_eq!(selected, Version::new(2, 2, 4));
    }

    #[test]
    fn test_roll_forward_minor_exhausted() {
        let available = versions(&["2.2.4", "2.2.5", "2.3.0"]);
        let err = roll_forward(&Version::new(2, 4, 0), &available, false).unwrap_err();
        assert!(matches!(err, Error::NoCompatibleVersion { .. }));
        assert_eq!(err.to_string(), "no compatible versions found for 2.4.0");
    }

    #[test]
    fn test_roll_forward_major_mismatch() {
        let available = versions(&["2.2.4", "2.2.5", "2.3.0"]);
        let err = roll_forward(&Version::new(3, 0, 0), &available, false).unwrap_err();
        assert!(matches!(err, Error::NoCompatibleVersion { .. }));
    }

    #[test]
    fn test_roll_forward_next_minor_takes_highest_patch() {
        let available = versions(&["6.0.1", "6.2.3", "6.2.9", "6.4.0"]);
        let selected = roll_forward(&Version::new(6, 1, 0), &available, true).unwrap();
        assert_eq!(selected, Version::new(6, 2, 9));
    }

    #[parameterized(
        exact_compatible = { "2.0.0", "2.1.13" },
        family_compatible = { "2.0.0", "2.1.*" },
        same_minor = { "6.0.0", "6.0.*" },
        minor_wildcard = { "2.1.3", "2.*" },
        minor_wildcard_high_runtime = { "2.2.0", "2.*.*" },
        any = { "2.1.3", "*" },
    )]
    fn test_check_compatible_ok(runtime: &str, requested: &str) {
        assert!(check_compatible(runtime, requested).is_ok());
    }

    #[test]
    fn test_check_compatible_major_mismatch() {
        let err = check_compatible("2.0.0", "3.0.*").unwrap_err();
        assert!(err
            .to_string()
            .contains("major versions of runtimes do not match"));
    }

    #[test]
    fn test_check_compatible_minor_wildcard_keeps_major() {
        let err = check_compatible("2.1.3", "3.*").unwrap_err();
        assert!(matches!(err, Error::IncompatibleVersion { .. }));
    }

    #[test]
    fn test_check_compatible_minor_lower() {
        let err = check_compatible("2.2.0", "2.1.*").unwrap_err();
        assert!(err
            .to_string()
            .contains("minor version of the runtimeconfig.json is greater"));
    }
}
