use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::ChangesetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    Patch,
    Minor,
    Major,
}

impl BumpType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BumpType {
    type Err = ChangesetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patch" => Ok(Self::Patch),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            _ => Err(ChangesetError::UnknownBumpType(s.to_string())),
        }
    }
}


/// How a package declares its dependency on another workspace package.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    #[default]
    Regular,
    Dev,
    Optional,
    Peer,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Regular => "regular",
            Self::Dev => "dev",
            Self::Optional => "optional",
            Self::Peer => "peer",
        };
        write!(f, "{s}")
    }
}

impl FromStr for DependencyKind {
    type Err = ChangesetError;

    /// Accepts both the short kind names and the manifest section names
    /// (`dependencies`, `devDependencies`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "regular" | "dependencies" => Ok(Self::Regular),
            "dev" | "devDependencies" | "dev-dependencies" => Ok(Self::Dev),
            "optional" | "optionalDependencies" => Ok(Self::Optional),
            "peer" | "peerDependencies" => Ok(Self::Peer),
            _ => Err(ChangesetError::UnknownDependencyKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub range: String,
    #[serde(default)]
    pub kind: DependencyKind,
}

/// A workspace package as seen by the planner.
///
/// `dependencies` may name packages outside the workspace; those edges are
/// ignored when the dependents graph is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub dependencies: IndexMap<String, Dependency>,
}

impl PackageInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            dependencies: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_dependency(
        mut self,
        name: impl Into<String>,
        range: impl Into<String>,
        kind: DependencyKind,
    ) -> Self {
        self.dependencies.insert(
            name.into(),
            Dependency {
                range: range.into(),
                kind,
            },
        );
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRelease {
    pub name: String,
    pub bump_type: BumpType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changeset {
    /// Identifier of the changeset, usually the file stem it was read from.
    pub id: String,
    pub summary: String,
    pub releases: Vec<PackageRelease>,
}

/// Packages that must always be released with the same version.
pub type LinkedGroup = Vec<String>;

/// A single planned package release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    #[serde(rename = "type")]
    pub bump_type: BumpType,
    pub old_version: Version,
    pub new_version: Version,
    /// Ids of the changesets that requested this release. Empty when the
    /// release was forced by a dependency or a linked group.
    pub changesets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePlan {
    pub changesets: Vec<Changeset>,
    pub releases: Vec<Release>,
}

impl ReleasePlan {
    #[must_use]
    pub fn release(&self, name: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.name == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}
