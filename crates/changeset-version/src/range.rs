use std::fmt;

use semver::{Version, VersionReq};

use crate::error::VersionError;

const WORKSPACE_PROTOCOL: &str = "workspace:";

const OPERATORS: [&str; 8] = ["<=", ">=", "~>", "<", ">", "=", "^", "~"];

/// A declared dependency range in the npm range grammar.
///
/// Alternatives are separated by `||`; within an alternative every
/// comparator must hold. Bare versions are exact (`1.2.3` only matches
/// `1.2.3`), partial bare versions match their prefix (`1.2` matches any
/// `1.2.x`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    source: String,
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// Parses a range string.
    ///
    /// # Errors
    ///
    /// Returns `VersionError` if any alternative is not a valid comparator set.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let alternatives = input
            .split("||")
            .map(|set| parse_comparator_set(set, input))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: input.trim().to_string(),
            alternatives,
        })
    }

    /// Parses a range as declared in a manifest, resolving the `workspace:`
    /// protocol against the current version of the dependency.
    ///
    /// `workspace:*` accepts any version, `workspace:^` and `workspace:~`
    /// expand to `^<version>` and `~<version>`, and any other
    /// `workspace:<range>` is treated as `<range>`.
    ///
    /// # Errors
    ///
    /// Returns `VersionError` if the resolved range cannot be parsed.
    pub fn parse_declared(input: &str, dependency_version: &Version) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let Some(rest) = trimmed.strip_prefix(WORKSPACE_PROTOCOL) else {
            return Self::parse(trimmed);
        };

        let resolved = match rest.trim() {
            "^" => format!("^{dependency_version}"),
            "~" => format!("~{dependency_version}"),
            other => other.to_string(),
        };
        let mut range = Self::parse(&resolved)?;
        range.source = trimmed.to_string();
        Ok(range)
    }

    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Checks whether `version` satisfies the npm-style `range`.
///
/// # Errors
///
/// Returns `VersionError` if `range` cannot be parsed.
pub fn satisfies(version: &Version, range: &str) -> Result<bool, VersionError> {
    Ok(VersionRange::parse(range)?.matches(version))
}

fn parse_comparator_set(set: &str, full: &str) -> Result<VersionReq, VersionError> {
    let tokens: Vec<&str> = set.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(VersionReq::STAR);
    }

    let comparators = if let [lower, "-", upper] = tokens.as_slice() {
        vec![
            format!(">={}", strip_v(lower)),
            format!("<={}", strip_v(upper)),
        ]
    } else {
        merge_detached_operators(&tokens, full)?
            .iter()
            .map(String::as_str)
            .map(normalize_comparator)
            .collect()
    };

    VersionReq::parse(&comparators.join(", ")).map_err(|source| VersionError::InvalidRange {
        range: full.trim().to_string(),
        source,
    })
}

/// Joins `>= 1.2.3` style tokens back into `>=1.2.3`.
fn merge_detached_operators(tokens: &[&str], full: &str) -> Result<Vec<String>, VersionError> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        if OPERATORS.contains(token) {
            let Some(operand) = iter.next() else {
                return Err(VersionError::MalformedRange {
                    range: full.trim().to_string(),
                    reason: "operator without a version",
                });
            };
            merged.push(format!("{token}{operand}"));
        } else {
            merged.push((*token).to_string());
        }
    }

    Ok(merged)
}

fn normalize_comparator(token: &str) -> String {
    let operator_len = token
        .find(|c: char| !matches!(c, '<' | '>' | '=' | '^' | '~'))
        .unwrap_or(token.len());
    let (operator, operand) = token.split_at(operator_len);
    let operand = strip_v(operand);

    match operator {
        "" if is_wildcard(operand) => collapse_wildcard(operand),
        "" => format!("={operand}"),
        "~>" => format!("~{operand}"),
        _ => format!("{operator}{operand}"),
    }
}

fn is_wildcard_part(part: &str) -> bool {
    matches!(part, "*" | "x" | "X")
}

fn is_wildcard(operand: &str) -> bool {
    operand.split('.').any(is_wildcard_part)
}

/// Cuts a partial version at its first wildcard: `x.x.x` becomes `*` and
/// `1.x.x` becomes `1.*`.
fn collapse_wildcard(operand: &str) -> String {
    let fixed: Vec<&str> = operand
        .split('.')
        .take_while(|part| !is_wildcard_part(part))
        .collect();
    if fixed.is_empty() {
        "*".to_string()
    } else {
        format!("{}.*", fixed.join("."))
    }
}

fn strip_v(operand: &str) -> &str {
    operand
        .strip_prefix('v')
        .or_else(|| operand.strip_prefix('V'))
        .unwrap_or(operand)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).expect("valid version")
    }

    fn sat(version: &str, range: &str) -> bool {
        satisfies(&v(version), range).expect("valid range")
    }

    #[test]
    fn bare_version_is_exact() {
        assert!(sat("1.0.0", "1.0.0"));
        assert!(!sat("1.0.1", "1.0.0"));
        assert!(sat("1.0.0", "=1.0.0"));
        assert!(sat("1.0.0", "v1.0.0"));
    }

    #[test]
    fn partial_bare_version_matches_prefix() {
        assert!(sat("1.2.9", "1.2"));
        assert!(!sat("1.3.0", "1.2"));
        assert!(sat("1.9.0", "1"));
        assert!(!sat("2.0.0", "1"));
    }

    #[test]
    fn caret_allows_compatible_updates() {
        assert!(sat("1.9.9", "^1.0.0"));
        assert!(!sat("2.0.0", "^1.0.0"));
        assert!(sat("0.1.5", "^0.1.0"));
        assert!(!sat("0.2.0", "^0.1.0"));
        assert!(!sat("0.0.4", "^0.0.3"));
    }

    #[test]
    fn tilde_allows_patch_updates() {
        assert!(sat("1.0.9", "~1.0.0"));
        assert!(!sat("1.1.0", "~1.0.0"));
        assert!(sat("1.4.2", "~>1.4.0"));
    }

    #[test]
    fn wildcards_and_empty_match_everything() {
        assert!(sat("7.3.1", "*"));
        assert!(sat("7.3.1", ""));
        assert!(sat("7.3.1", "x"));
        assert!(sat("1.4.0", "1.x"));
        assert!(!sat("2.0.0", "1.x"));
        assert!(sat("1.2.8", "1.2.*"));
        assert!(sat("7.3.1", "x.x.x"));
        assert!(sat("7.3.1", "*.*.*"));
        assert!(sat("7.3.1", "X.x"));
        assert!(sat("1.4.2", "1.x.x"));
        assert!(!sat("2.0.0", "1.x.x"));
        assert!(sat("1.2.8", "1.2.x"));
    }

    #[test]
    fn whitespace_separated_comparators_intersect() {
        assert!(sat("1.5.0", ">=1.2.0 <2.0.0"));
        assert!(!sat("2.0.0", ">=1.2.0 <2.0.0"));
        assert!(sat("1.5.0", ">= 1.2.0 < 2.0.0"));
    }

    #[test]
    fn alternatives_union() {
        assert!(sat("1.0.3", "~1.0.0 || ^3.0.0"));
        assert!(sat("3.4.0", "~1.0.0 || ^3.0.0"));
        assert!(!sat("2.0.0", "~1.0.0 || ^3.0.0"));
    }

    #[test]
    fn hyphen_range_is_inclusive() {
        assert!(sat("1.2.3", "1.2.3 - 2.3.4"));
        assert!(sat("2.3.4", "1.2.3 - 2.3.4"));
        assert!(!sat("2.3.5", "1.2.3 - 2.3.4"));
        assert!(sat("2.3.9", "1.2.3 - 2.3"));
    }

    #[test]
    fn prerelease_only_matches_same_tuple() {
        assert!(!sat("2.0.0-beta.1", "^1.0.0"));
        assert!(sat("1.0.0-beta.2", ">=1.0.0-beta.1"));
        assert!(!sat("1.1.0-beta.2", ">=1.0.0-beta.1"));
    }

    #[test]
    fn invalid_range_is_an_error() {
        let err = satisfies(&v("1.0.0"), "not-a-range").expect_err("should fail");
        assert!(err.to_string().contains("not-a-range"));
    }

    #[test]
    fn dangling_operator_is_an_error() {
        let err = VersionRange::parse(">=").expect_err("should fail");
        assert!(matches!(err, VersionError::MalformedRange { .. }));
    }

    #[test]
    fn workspace_protocol_star_matches_anything() {
        let range = VersionRange::parse_declared("workspace:*", &v("1.0.0")).expect("valid");
        assert!(range.matches(&v("9.0.0")));
        assert_eq!(range.as_str(), "workspace:*");
    }

    #[test]
    fn workspace_protocol_caret_resolves_against_current_version() {
        let range = VersionRange::parse_declared("workspace:^", &v("1.2.0")).expect("valid");
        assert!(range.matches(&v("1.3.0")));
        assert!(!range.matches(&v("2.0.0")));
    }

    #[test]
    fn workspace_protocol_tilde_resolves_against_current_version() {
        let range = VersionRange::parse_declared("workspace:~", &v("1.2.0")).expect("valid");
        assert!(range.matches(&v("1.2.5")));
        assert!(!range.matches(&v("1.3.0")));
    }

    #[test]
    fn workspace_protocol_with_explicit_range() {
        let range = VersionRange::parse_declared("workspace:1.0.0", &v("1.0.0")).expect("valid");
        assert!(range.matches(&v("1.0.0")));
        assert!(!range.matches(&v("1.0.1")));
    }

    #[test]
    fn plain_declared_range_is_unchanged() {
        let range = VersionRange::parse_declared("^2.0.0", &v("2.1.0")).expect("valid");
        assert!(range.matches(&v("2.9.0")));
        assert_eq!(range.to_string(), "^2.0.0");
    }
}
