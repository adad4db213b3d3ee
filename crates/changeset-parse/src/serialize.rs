use indexmap::IndexMap;

use changeset_core::{BumpType, Changeset};

use crate::error::{FormatError, ValidationError};
use crate::parse::FRONT_MATTER_DELIMITER;

/// Renders a changeset in the front-matter format read by
/// [`parse_changeset`](crate::parse_changeset).
///
/// The id is not part of the text; it is the name the caller stores the
/// content under.
///
/// # Errors
///
/// Returns `FormatError` if the changeset has no releases or YAML
/// serialization fails.
#[must_use = "serialization result should be handled"]
pub fn serialize_changeset(changeset: &Changeset) -> Result<String, FormatError> {
    if changeset.releases.is_empty() {
        return Err(ValidationError::NoReleases.into());
    }

    let releases: IndexMap<&str, BumpType> = changeset
        .releases
        .iter()
        .map(|r| (r.name.as_str(), r.bump_type))
        .collect();
    let yaml = serde_yml::to_string(&releases)?;

    let mut output = format!("{FRONT_MATTER_DELIMITER}\n{yaml}");
    if !yaml.ends_with('\n') {
        output.push('\n');
    }
    output.push_str(FRONT_MATTER_DELIMITER);
    output.push('\n');

    if !changeset.summary.is_empty() {
        output.push_str(&changeset.summary);
        output.push('\n');
    }

    Ok(output)
}
