use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use changeset_core::{LinkedGroup, PackageInfo};
use tracing::warn;

use crate::error::ProjectError;
use crate::manifest::{ChangelogValue, WrittenConfig};

const DEFAULT_BASE_BRANCH: &str = "master";
const DEFAULT_CHANGELOG_GENERATOR: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Restricted,
    Public,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restricted => write!(f, "restricted"),
            Self::Public => write!(f, "public"),
        }
    }
}

/// Changelog generator name plus its optional generator-specific options.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangelogGenerator {
    name: String,
    options: Option<toml::Table>,
}

impl ChangelogGenerator {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn options(&self) -> Option<&toml::Table> {
        self.options.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangesetConfig {
    commit: bool,
    access: Access,
    base_branch: String,
    changelog: Option<ChangelogGenerator>,
    linked: Vec<LinkedGroup>,
}

impl Default for ChangesetConfig {
    fn default() -> Self {
        Self {
            commit: false,
            access: Access::default(),
            base_branch: String::from(DEFAULT_BASE_BRANCH),
            changelog: Some(ChangelogGenerator {
                name: String::from(DEFAULT_CHANGELOG_GENERATOR),
                options: None,
            }),
            linked: Vec::new(),
        }
    }
}

impl ChangesetConfig {
    /// Parses and validates a TOML configuration against the workspace
    /// packages.
    ///
    /// All validation problems are collected and reported together.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::TomlParse` for malformed TOML and
    /// `ProjectError::Validation` when option values are invalid, a linked
    /// package does not exist, or a package appears in more than one linked
    /// group.
    pub fn parse(content: &str, packages: &[PackageInfo]) -> Result<Self, ProjectError> {
        let written: WrittenConfig = toml::from_str(content)?;
        let mut messages = Vec::new();

        let access = parse_access(written.access.as_deref(), &mut messages);
        let changelog = parse_changelog(written.changelog, &mut messages);
        let linked = written.linked.unwrap_or_default();
        validate_linked(&linked, packages, &mut messages);

        if !messages.is_empty() {
            return Err(ProjectError::Validation { messages });
        }

        let defaults = Self::default();
        Ok(Self {
            commit: written.commit.unwrap_or(defaults.commit),
            access,
            base_branch: written.base_branch.unwrap_or(defaults.base_branch),
            changelog: changelog.unwrap_or(defaults.changelog),
            linked,
        })
    }

    #[must_use]
    pub fn commit(&self) -> bool {
        self.commit
    }

    #[must_use]
    pub fn access(&self) -> Access {
        self.access
    }

    #[must_use]
    pub fn base_branch(&self) -> &str {
        &self.base_branch
    }

    #[must_use]
    pub fn changelog(&self) -> Option<&ChangelogGenerator> {
        self.changelog.as_ref()
    }

    #[must_use]
    pub fn linked(&self) -> &[LinkedGroup] {
        &self.linked
    }

    #[cfg(any(test, feature = "testing"))]
    #[must_use]
    pub fn with_linked(mut self, linked: Vec<LinkedGroup>) -> Self {
        self.linked = linked;
        self
    }
}

/// Reads `<changeset_dir>/config.toml`. A missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, or if
/// [`ChangesetConfig::parse`] rejects it.
pub fn read_config(
    changeset_dir: &Path,
    packages: &[PackageInfo],
) -> Result<ChangesetConfig, ProjectError> {
    let path = changeset_dir.join(crate::DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(&path) {
        Ok(content) => ChangesetConfig::parse(&content, packages),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(ChangesetConfig::default())
        }
        Err(source) => Err(ProjectError::ConfigRead { path, source }),
    }
}

fn parse_access(value: Option<&str>, messages: &mut Vec<String>) -> Access {
    match value {
        None | Some("restricted") => Access::Restricted,
        Some("public") => Access::Public,
        Some("private") => {
            warn!(
                "the `access` option is set as \"private\", but the correct form is \"restricted\""
            );
            Access::Restricted
        }
        Some(other) => {
            messages.push(format!(
                "The `access` option is set as \"{other}\" when the only valid values are \"public\" or \"restricted\""
            ));
            Access::default()
        }
    }
}

/// `None` means "not set"; `Some(None)` means changelogs are disabled.
fn parse_changelog(
    value: Option<ChangelogValue>,
    messages: &mut Vec<String>,
) -> Option<Option<ChangelogGenerator>> {
    match value? {
        ChangelogValue::Toggle(false) => Some(None),
        ChangelogValue::Toggle(true) => {
            messages.push(
                "The `changelog` option is set as true when the only valid values are false, a generator name or a [name, options] pair".to_string(),
            );
            None
        }
        ChangelogValue::Generator(name) => Some(Some(ChangelogGenerator {
            name,
            options: None,
        })),
        ChangelogValue::GeneratorWithOptions(name, options) => Some(Some(ChangelogGenerator {
            name,
            options: Some(options),
        })),
    }
}

fn validate_linked(linked: &[LinkedGroup], packages: &[PackageInfo], messages: &mut Vec<String>) {
    let known: HashSet<&str> = packages.iter().map(|p| p.name.as_str()).collect();
    let mut seen = HashSet::new();
    let mut duplicated = Vec::new();

    for name in linked.iter().flatten() {
        if !known.contains(name.as_str()) {
            messages.push(format!(
                "The package \"{name}\" is specified in the `linked` option but it is not found in the project. You may have misspelled the package name."
            ));
        }
        if !seen.insert(name.as_str()) && !duplicated.contains(&name.as_str()) {
            duplicated.push(name.as_str());
        }
    }

    for name in duplicated {
        messages.push(format!(
            "The package \"{name}\" is in multiple sets of linked packages. Packages can only be in a single set of linked packages."
        ));
    }
}
