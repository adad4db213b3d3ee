use changeset_core::{BumpType, PackageInfo};
use changeset_version::{apply_bump, combine};
use indexmap::IndexMap;
use semver::Version;

use crate::error::{PlanError, Result};

/// The planned change for one package while the plan is being assembled.
///
/// Intents only grow: the bump kind and the version override can be raised
/// but never lowered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseIntent {
    name: String,
    old_version: Version,
    bump_type: Option<BumpType>,
    bumped: Version,
    version_override: Option<Version>,
    changesets: Vec<String>,
}

impl ReleaseIntent {
    #[must_use]
    pub fn new(name: impl Into<String>, old_version: Version) -> Self {
        Self {
            name: name.into(),
            bumped: old_version.clone(),
            old_version,
            bump_type: None,
            version_override: None,
            changesets: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn old_version(&self) -> &Version {
        &self.old_version
    }

    #[must_use]
    pub fn bump_type(&self) -> Option<BumpType> {
        self.bump_type
    }

    #[must_use]
    pub fn version_override(&self) -> Option<&Version> {
        self.version_override.as_ref()
    }

    #[must_use]
    pub fn changesets(&self) -> &[String] {
        &self.changesets
    }

    /// The version this package would be released at right now.
    ///
    /// An override wins over the bump arithmetic unless the bump has since
    /// been raised past it.
    #[must_use]
    pub fn new_version(&self) -> Version {
        match &self.version_override {
            Some(version) if *version > self.bumped => version.clone(),
            _ => self.bumped.clone(),
        }
    }

    #[must_use]
    pub fn is_release(&self) -> bool {
        self.new_version() > self.old_version
    }

    /// Returns `true` if the bump kind increased.
    ///
    /// The intent is left unchanged when the raised bump cannot be applied
    /// to the old version.
    pub(crate) fn raise_bump(&mut self, bump: BumpType) -> Result<bool> {
        let combined = combine(self.bump_type, Some(bump));
        if combined == self.bump_type {
            return Ok(false);
        }
        self.bumped = apply_bump(&self.old_version, combined).map_err(|source| {
            PlanError::VersionOverflow {
                package: self.name.clone(),
                source,
            }
        })?;
        self.bump_type = combined;
        Ok(true)
    }

    /// Returns `true` if the override was introduced or increased.
    pub(crate) fn raise_override(&mut self, version: &Version) -> bool {
        if self
            .version_override
            .as_ref()
            .is_some_and(|current| current >= version)
        {
            return false;
        }
        self.version_override = Some(version.clone());
        true
    }

    pub(crate) fn record_changeset(&mut self, id: &str) {
        if !self.changesets.iter().any(|existing| existing == id) {
            self.changesets.push(id.to_string());
        }
    }
}

/// Accumulator of release intents, owned by the planner for one planning run.
///
/// Iteration follows first-touch order: the order in which packages were
/// first given an intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentMap {
    intents: IndexMap<String, ReleaseIntent>,
}

impl IntentMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ReleaseIntent> {
        self.intents.get(name)
    }

    /// Returns the intent for `package`, creating an empty one on first touch.
    pub(crate) fn touch(&mut self, package: &PackageInfo) -> &mut ReleaseIntent {
        self.intents
            .entry(package.name.clone())
            .or_insert_with(|| ReleaseIntent::new(package.name.clone(), package.version.clone()))
    }

    /// Planned version of `package`, or its current version when nothing is
    /// planned.
    #[must_use]
    pub fn tentative_version(&self, package: &PackageInfo) -> Version {
        self.intents
            .get(&package.name)
            .map_or_else(|| package.version.clone(), ReleaseIntent::new_version)
    }

    #[must_use]
    pub fn is_released(&self, name: &str) -> bool {
        self.intents.get(name).is_some_and(ReleaseIntent::is_release)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReleaseIntent> {
        self.intents.values()
    }

    pub fn releases(&self) -> impl Iterator<Item = &ReleaseIntent> {
        self.iter().filter(|intent| intent.is_release())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}
