use indexmap::IndexMap;
use serde::Deserialize;
use serde_with::{MapPreventDuplicates, serde_as};

use changeset_core::{BumpType, Changeset, PackageRelease};

use crate::error::{FormatError, FrontMatterError, ValidationError};

pub(crate) const FRONT_MATTER_DELIMITER: &str = "---";

const MAX_INPUT_SIZE: usize = 100 * 1024 * 1024;

#[serde_as]
#[derive(Deserialize)]
struct ReleasesMap {
    #[serde(flatten)]
    #[serde_as(as = "MapPreventDuplicates<_, _>")]
    releases: IndexMap<String, BumpType>,
}

struct FrontMatter<'a> {
    yaml: &'a str,
    body: &'a str,
}

fn skip_newline(s: &str) -> &str {
    s.strip_prefix("\r\n")
        .or_else(|| s.strip_prefix('\n'))
        .unwrap_or(s)
}

/// Position of a `---` line inside `content`, which starts right after the
/// opening delimiter line.
fn closing_delimiter_offset(content: &str) -> Option<usize> {
    if content.starts_with(FRONT_MATTER_DELIMITER) {
        return Some(0);
    }
    content
        .find("\n---")
        .map(|pos| pos + 1)
}

fn split_front_matter(content: &str) -> Result<FrontMatter<'_>, FrontMatterError> {
    let rest = content
        .trim_start()
        .strip_prefix(FRONT_MATTER_DELIMITER)
        .ok_or(FrontMatterError::MissingOpeningDelimiter)?;
    let rest = skip_newline(rest);

    let closing = closing_delimiter_offset(rest).ok_or(FrontMatterError::MissingClosingDelimiter)?;

    let yaml = rest[..closing].trim_end_matches(['\r', '\n']);
    if yaml.trim().is_empty() {
        return Err(FrontMatterError::EmptyFrontMatter);
    }

    let body = skip_newline(&rest[closing + FRONT_MATTER_DELIMITER.len()..]);
    Ok(FrontMatter { yaml, body })
}

/// Parses a changeset file's content.
///
/// `id` identifies the changeset in release provenance; callers reading from
/// disk use the file stem.
///
/// # Errors
///
/// Returns `FormatError` if the front matter is missing or malformed, names a
/// package twice, uses an unknown bump type, or declares no releases.
#[must_use = "parsing result should be handled"]
pub fn parse_changeset(id: &str, content: &str) -> Result<Changeset, FormatError> {
    if content.len() > MAX_INPUT_SIZE {
        return Err(ValidationError::InputTooLarge {
            max_bytes: MAX_INPUT_SIZE,
        }
        .into());
    }
    if id.trim().is_empty() {
        return Err(ValidationError::EmptyId.into());
    }

    let front_matter = split_front_matter(content)?;
    let ReleasesMap { releases } = serde_yml::from_str(front_matter.yaml)?;

    if releases.is_empty() {
        return Err(ValidationError::NoReleases.into());
    }

    Ok(Changeset {
        id: id.trim().to_string(),
        summary: front_matter.body.trim().to_string(),
        releases: releases
            .into_iter()
            .map(|(name, bump_type)| PackageRelease { name, bump_type })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_package_with_summary() {
        let content = r#"---
"pkg-a": patch
---
Handle empty lockfiles when resolving peers.
"#;

        let changeset = parse_changeset("quiet-lions-jump", content).expect("should parse");
        assert_eq!(changeset.id, "quiet-lions-jump");
        assert_eq!(
            changeset.releases,
            vec![PackageRelease {
                name: "pkg-a".to_string(),
                bump_type: BumpType::Patch,
            }]
        );
        assert_eq!(
            changeset.summary,
            "Handle empty lockfiles when resolving peers."
        );
    }

    #[test]
    fn releases_keep_declaration_order() {
        let content = r#"---
"@scope/zeta": major
"alpha": minor
"mid": patch
---
Rework the public API.
"#;

        let changeset = parse_changeset("big-cats-delight", content).expect("should parse");
        let names: Vec<_> = changeset.releases.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["@scope/zeta", "alpha", "mid"]);
        assert_eq!(changeset.releases[0].bump_type, BumpType::Major);
    }

    #[test]
    fn multiline_summary_is_kept_verbatim() {
        let content = r#"---
"pkg-b": minor
---
Add `--filter`.

- supports globs
- supports negation
"#;

        let changeset = parse_changeset("id", content).expect("should parse");
        assert!(changeset.summary.starts_with("Add `--filter`."));
        assert!(changeset.summary.ends_with("- supports negation"));
    }

    #[test]
    fn empty_body_gives_empty_summary() {
        let changeset =
            parse_changeset("id", "---\n\"pkg-a\": patch\n---\n").expect("should parse");
        assert!(changeset.summary.is_empty());
    }

    #[test]
    fn delimiter_inside_summary_line_is_text() {
        let content = "---\n\"pkg-a\": patch\n---\nUse a --- b syntax.\n";

        let changeset = parse_changeset("id", content).expect("should parse");
        assert_eq!(changeset.summary, "Use a --- b syntax.");
    }

    #[test]
    fn crlf_line_endings() {
        let content = "---\r\n\"pkg-a\": patch\r\n\"pkg-b\": major\n---\r\nWindows summary.\r\n";

        let changeset = parse_changeset("id", content).expect("should parse");
        assert_eq!(changeset.releases.len(), 2);
        assert_eq!(changeset.releases[1].name, "pkg-b");
        assert_eq!(changeset.summary, "Windows summary.");
    }

    #[test]
    fn leading_whitespace_before_front_matter() {
        let content = "\n\n---\n\"pkg-a\": minor\n---\nSummary";

        let changeset = parse_changeset("id", content).expect("should parse");
        assert_eq!(changeset.releases[0].bump_type, BumpType::Minor);
        assert_eq!(changeset.summary, "Summary");
    }

    #[test]
    fn id_is_trimmed() {
        let changeset = parse_changeset("  spicy-tacos  ", "---\n\"pkg-a\": patch\n---\n")
            .expect("should parse");
        assert_eq!(changeset.id, "spicy-tacos");
    }

    #[test]
    fn error_empty_id() {
        let err = parse_changeset(" ", "---\n\"pkg-a\": patch\n---\n").expect_err("should fail");
        assert!(matches!(
            err,
            FormatError::Validation(ValidationError::EmptyId)
        ));
    }

    #[test]
    fn error_missing_opening_delimiter() {
        let err = parse_changeset("id", "\"pkg-a\": patch\n---\nSummary.\n")
            .expect_err("should fail");
        assert!(err.to_string().contains("opening delimiter"));
    }

    #[test]
    fn error_missing_closing_delimiter() {
        let err =
            parse_changeset("id", "---\n\"pkg-a\": patch\nSummary.\n").expect_err("should fail");
        assert!(err.to_string().contains("closing delimiter"));
    }

    #[test]
    fn error_empty_front_matter() {
        let err = parse_changeset("id", "---\n---\nSummary.\n").expect_err("should fail");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn error_unknown_bump_type() {
        let err =
            parse_changeset("id", "---\n\"pkg-a\": none\n---\n").expect_err("should fail");
        assert!(matches!(err, FormatError::Yaml(_)));
    }

    #[test]
    fn error_no_releases() {
        let err = parse_changeset("id", "---\n{}\n---\nSummary.\n").expect_err("should fail");
        assert!(err.to_string().contains("at least one release"));
    }

    #[test]
    fn error_duplicate_package() {
        let content = "---\n\"pkg-a\": major\n\"pkg-a\": patch\n---\n";

        let err = parse_changeset("id", content).expect_err("should fail");
        let message = err.to_string();
        assert!(
            message.contains("duplicate"),
            "expected 'duplicate' in error message, got: {message}"
        );
    }

    #[test]
    fn error_input_too_large() {
        let huge = "a".repeat(MAX_INPUT_SIZE + 1);

        let err = parse_changeset("id", &huge).expect_err("should fail");
        assert!(err.to_string().contains("maximum size"));
    }
}
