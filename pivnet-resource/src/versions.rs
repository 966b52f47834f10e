//! Version ordering.
//!
//! All orderings produced here are newest first, matching the order in which
//! the release API lists releases.

use crate::concourse::SortBy;
use pivnet::v2::Release;
use semver::{Prerelease, Version};
use std::cmp::Ordering;

/// Parse a version leniently.
///
/// A leading `v` is ignored and missing minor/patch components are
/// zero-filled, so `v2.1` parses as `2.1.0`.
pub fn parse_lenient(version: &str) -> Option<Version> {
    let trimmed = version.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    let split = trimmed.find(|c| c == '-' || c == '+').unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split);
    let padded = match core.split('.').count() {
        1 => format!("{}.0.0{}", core, suffix),
        2 => format!("{}.0{}", core, suffix),
        _ => trimmed.to_string(),
    };

    Version::parse(&padded).ok()
}

fn precedence_key(v: &Version) -> (u64, u64, u64, &Prerelease) {
    (v.major, v.minor, v.patch, &v.pre)
}

/// Compare two versions by ascending semantic-version precedence.
///
/// Build metadata is ignored. Unparseable versions rank below all
/// parseable ones and compare lexically among themselves.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (parse_lenient(a), parse_lenient(b)) {
        (Some(va), Some(vb)) => precedence_key(&va).cmp(&precedence_key(&vb)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

/// Order version strings newest first according to `policy`.
pub fn sort_versions<S: AsRef<str>>(policy: SortBy, versions: &[S]) -> Vec<String> {
    let mut sorted: Vec<String> = versions.iter().map(|v| v.as_ref().to_string()).collect();
    if policy == SortBy::Semver {
        sorted.sort_by(|a, b| compare(b, a));
    }
    sorted
}

/// Order releases newest first according to `policy`.
pub fn sort_releases(policy: SortBy, mut releases: Vec<Release>) -> Vec<Release> {
    if policy == SortBy::Semver {
        releases.sort_by(|a, b| compare(&b.version, &a.version));
    }
    releases
}

/// Versions to report to the pipeline, oldest first.
///
/// `ordered` is newest first. The result runs from `current` (inclusive) to
/// the newest version; when `current` is unset or no longer listed, only the
/// newest version is returned.
pub fn versions_since(ordered: &[String], current: Option<&str>) -> Vec<String> {
    let newest = match ordered.first() {
        Some(newest) => newest,
        None => return vec![],
    };

    let position = current.and_then(|current| ordered.iter().position(|v| v == current));
    match position {
        Some(idx) => ordered[..=idx].iter().rev().cloned().collect(),
        None => vec![newest.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use test_case::test_case;

    #[test_case("1.2.3", Some("1.2.3") ; "full")]
    #[test_case("v1.2.3", Some("1.2.3") ; "leading v")]
    #[test_case("2.1", Some("2.1.0") ; "missing patch")]
    #[test_case("7", Some("7.0.0") ; "major only")]
    #[test_case("1.0-rc.1", Some("1.0.0-rc.1") ; "short prerelease")]
    #[test_case("1.2.3+build.5", Some("1.2.3+build.5") ; "build metadata")]
    #[test_case("not-a-version", None ; "garbage")]
    #[test_case("1.2.3.4", None ; "too many components")]
    fn lenient_parsing(input: &str, expected: Option<&str>) {
        let parsed = parse_lenient(input).map(|v| v.to_string());
        assert_eq!(parsed.as_deref(), expected);
    }

    #[test]
    fn semver_precedence() {
        let input = vec![
            "1.0.0-alpha",
            "1.10.0",
            "1.0.0",
            "1.0.0-beta.11",
            "1.2.0",
            "1.0.0-alpha.1",
            "1.0.0-rc.1",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.9.3",
        ];
        let expected = vec![
            "1.10.0",
            "1.9.3",
            "1.2.0",
            "1.0.0",
            "1.0.0-rc.1",
            "1.0.0-beta.11",
            "1.0.0-beta.2",
            "1.0.0-beta",
            "1.0.0-alpha.1",
            "1.0.0-alpha",
        ];
        pretty_assertions::assert_eq!(sort_versions(SortBy::Semver, &input), expected);
    }

    #[test]
    fn semver_order_is_independent_of_input_order() {
        let newest_first = vec![
            "v2.0.0",
            "1.10",
            "1.9.3",
            "1.9.3-rc.10-build",
            "1.9.3-rc.2",
            "0.1",
            "snapshot",
        ];

        for permutation in newest_first.iter().permutations(newest_first.len()) {
            assert_eq!(
                sort_versions(SortBy::Semver, &permutation),
                newest_first,
                "input order: {:?}",
                permutation
            );
        }
    }

    #[test]
    fn semver_ordering_is_consistent_with_precedence() {
        let input = vec!["3.0", "v2.5.1", "10.0.0", "2.5.1-build", "0.9"];
        let sorted = sort_versions(SortBy::Semver, &input);

        for pair in sorted.windows(2) {
            let newer = parse_lenient(&pair[0]).unwrap();
            let older = parse_lenient(&pair[1]).unwrap();
            assert!(precedence_key(&newer) >= precedence_key(&older));
        }
    }

    #[test]
    fn unparseable_versions_rank_last() {
        let input = vec!["beta", "1.0.0", "alpha", "0.1.0"];
        assert_eq!(
            sort_versions(SortBy::Semver, &input),
            vec!["1.0.0", "0.1.0", "beta", "alpha"]
        );
    }

    #[test]
    fn equal_precedence_keeps_input_order() {
        let input = vec!["1.0.0+b", "1.0", "v1.0.0"];
        assert_eq!(sort_versions(SortBy::Semver, &input), input);
    }

    #[test]
    fn none_keeps_input_order() {
        let input = vec!["1.0.0", "3.0.0", "garbage", "2.0.0"];
        assert_eq!(sort_versions(SortBy::None, &input), input);
    }

    #[test]
    fn sort_releases_by_version() {
        let releases = vec!["1.1.0", "1.10.0", "1.9.0"]
            .into_iter()
            .enumerate()
            .map(|(id, version)| Release {
                id: id as i64,
                version: version.to_string(),
                ..Default::default()
            })
            .collect::<Vec<_>>();

        let ids = |rs: Vec<Release>| rs.into_iter().map(|r| r.id).collect::<Vec<_>>();
        assert_eq!(ids(sort_releases(SortBy::Semver, releases.clone())), vec![1, 2, 0]);
        assert_eq!(ids(sort_releases(SortBy::None, releases)), vec![0, 1, 2]);
    }

    fn owned(versions: &[&str]) -> Vec<String> {
        versions.iter().map(|v| v.to_string()).collect()
    }

    #[test_case(&[], None, &[] ; "empty")]
    #[test_case(&["3", "2", "1"], None, &["3"] ; "no current version")]
    #[test_case(&["3", "2", "1"], Some("1"), &["1", "2", "3"] ; "oldest current")]
    #[test_case(&["3", "2", "1"], Some("2"), &["2", "3"] ; "middle current")]
    #[test_case(&["3", "2", "1"], Some("3"), &["3"] ; "already newest")]
    #[test_case(&["3", "2", "1"], Some("0"), &["3"] ; "unknown current")]
    fn since(ordered: &[&str], current: Option<&str>, expected: &[&str]) {
        assert_eq!(versions_since(&owned(ordered), current), owned(expected));
    }
}
