//! Minimum-version selection using semver.
//!
//! The crawler always works with the smallest version available: a
//! node's dependencies are fetched for its minimum known version, and a
//! dependency range resolves to the lowest published version that
//! satisfies it. Changing this policy changes which dependencies get
//! discovered, so it is preserved exactly.

use crate::error::Error;
use semver::{Version, VersionReq};

/// Pick the lowest version satisfying a range.
///
/// # Rules
/// - An empty range or `*` matches everything (lowest version wins)
/// - An exact version is returned if present
/// - A semver range returns the lowest satisfying version
/// - OR ranges like `^1.0.0 || ^2.0.0` match any alternative
///
/// Returns `None` when no version satisfies the range; `Err` only for
/// a range that cannot be parsed at all.
pub fn lowest_matching(versions: &[Version], range: &str) -> Result<Option<Version>, Error> {
    let range = range.trim();

    let mut ascending: Vec<&Version> = versions.iter().collect();
    ascending.sort();

    // Exact version present wins outright.
    if let Ok(exact) = Version::parse(range) {
        if versions.contains(&exact) {
            return Ok(Some(exact));
        }
    }

    let reqs = parse_alternatives(range)?;

    for version in ascending {
        if reqs.iter().any(|req| req.matches(version)) {
            return Ok(Some(version.clone()));
        }
    }

    Ok(None)
}

/// Parse a range into its OR alternatives (usually just one).
fn parse_alternatives(range: &str) -> Result<Vec<VersionReq>, Error> {
    if !range.contains("||") {
        return Ok(vec![parse_range(range)?]);
    }

    let mut reqs = Vec::new();
    for alt in range.split("||").map(str::trim) {
        if alt.is_empty() {
            continue;
        }
        // Skip invalid alternatives as long as one parses.
        if let Ok(req) = parse_range(alt) {
            reqs.push(req);
        }
    }

    if reqs.is_empty() {
        return Err(Error::InvalidRange {
            range: range.to_string(),
            reason: "no valid alternatives".to_string(),
        });
    }
    Ok(reqs)
}

/// Parse a single version range, handling registry-specific syntax.
///
/// Handles:
/// - Standard semver ranges: ^1.0.0, ~1.0.0, >=1.0.0, etc.
/// - Hyphen ranges: 1.0.0 - 2.0.0
/// - X-ranges: 1.x, 1.0.x, *, and the empty range
/// - Space-separated comparators: >=2.1.2 <3.0.0
pub fn parse_range(range: &str) -> Result<VersionReq, Error> {
    let range = range.trim();

    if range.is_empty() || range == "*" || range == "x" || range == "X" {
        return Ok(VersionReq::STAR);
    }

    // Hyphen ranges: "1.0.0 - 2.0.0" -> ">=1.0.0, <=2.0.0"
    if let Some((start, end)) = split_hyphen_range(range) {
        let converted = format!(">={start}, <={end}");
        return VersionReq::parse(&converted).map_err(|e| invalid(range, &e));
    }

    // X-ranges: "1.x" -> ">=1.0.0, <2.0.0"
    if range.contains(['x', 'X']) {
        if let Some(converted) = convert_x_range(range) {
            return VersionReq::parse(&converted).map_err(|e| invalid(range, &e));
        }
    }

    // Space-separated comparators mean AND: ">=2.1.2 <3.0.0"
    let converted = join_space_comparators(range);
    VersionReq::parse(&converted).map_err(|e| invalid(range, &e))
}

fn invalid(range: &str, e: &semver::Error) -> Error {
    Error::InvalidRange {
        range: range.to_string(),
        reason: e.to_string(),
    }
}

/// Split a hyphen range like "1.0.0 - 2.0.0".
fn split_hyphen_range(range: &str) -> Option<(&str, &str)> {
    let (start, end) = range.split_once(" - ")?;
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() {
        return None;
    }
    Some((start, end))
}

/// Convert an x-range to an explicit bound pair.
fn convert_x_range(range: &str) -> Option<String> {
    let parts: Vec<&str> = range.split('.').collect();

    match parts.as_slice() {
        [major, "x" | "X" | "*"] => {
            let m: u64 = major.parse().ok()?;
            Some(format!(">={m}.0.0, <{}.0.0", m + 1))
        }
        [major, minor, "x" | "X" | "*"] => {
            let m: u64 = major.parse().ok()?;
            let n: u64 = minor.parse().ok()?;
            Some(format!(">={m}.{n}.0, <{m}.{}.0", n + 1))
        }
        _ => None,
    }
}

/// Join space-separated comparators with commas for `VersionReq`.
fn join_space_comparators(range: &str) -> String {
    if !range.contains(' ') {
        return range.to_string();
    }
    range
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(list: &[&str]) -> Vec<Version> {
        list.iter().map(|s| Version::parse(s).unwrap()).collect()
    }

    fn lowest(list: &[&str], range: &str) -> Option<String> {
        lowest_matching(&versions(list), range)
            .unwrap()
            .map(|v| v.to_string())
    }

    #[test]
    fn test_lowest_matching_picks_smallest() {
        let pool = ["2.0.0", "1.2.0", "1.0.0", "1.5.0"];
        assert_eq!(lowest(&pool, "^1.0.0"), Some("1.0.0".to_string()));
        assert_eq!(lowest(&pool, ">=1.2.0"), Some("1.2.0".to_string()));
    }

    #[test]
    fn test_exact_version() {
        let pool = ["1.0.0", "1.5.0"];
        assert_eq!(lowest(&pool, "1.5.0"), Some("1.5.0".to_string()));
        assert_eq!(lowest(&pool, "9.9.9"), None);
    }

    #[test]
    fn test_star_and_empty_match_lowest() {
        let pool = ["3.0.0", "0.1.0"];
        assert_eq!(lowest(&pool, "*"), Some("0.1.0".to_string()));
        assert_eq!(lowest(&pool, ""), Some("0.1.0".to_string()));
    }

    #[test]
    fn test_x_ranges() {
        let pool = ["0.9.0", "1.0.0", "1.2.3", "2.0.0"];
        assert_eq!(lowest(&pool, "1.x"), Some("1.0.0".to_string()));
        assert_eq!(lowest(&pool, "1.2.x"), Some("1.2.3".to_string()));
    }

    #[test]
    fn test_hyphen_range() {
        let pool = ["0.5.0", "1.1.0", "2.5.0"];
        assert_eq!(lowest(&pool, "1.0.0 - 2.0.0"), Some("1.1.0".to_string()));
    }

    #[test]
    fn test_or_range() {
        let pool = ["0.5.0", "2.1.0", "3.0.0"];
        assert_eq!(
            lowest(&pool, "^1.0.0 || ^2.0.0"),
            Some("2.1.0".to_string())
        );
    }

    #[test]
    fn test_space_separated_comparators() {
        let pool = ["1.0.0", "2.5.0", "3.5.0"];
        assert_eq!(lowest(&pool, ">=2.0.0 <3.0.0"), Some("2.5.0".to_string()));
    }

    #[test]
    fn test_no_match() {
        let pool = ["1.0.0"];
        assert_eq!(lowest(&pool, "^2.0.0"), None);
    }

    #[test]
    fn test_garbage_range_is_an_error() {
        assert!(lowest_matching(&versions(&["1.0.0"]), "not a range").is_err());
    }
}
