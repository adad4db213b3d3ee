use changeset_core::{DependencyKind, PackageInfo};
use changeset_version::VersionRange;
use indexmap::IndexMap;

use crate::error::PlanError;
use crate::packages::PackageSet;

/// A package that declares a dependency on another workspace package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependent {
    pub name: String,
    pub kind: DependencyKind,
    pub range: String,
}

/// Reverse dependency index: package name to the packages depending on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependentsGraph {
    dependents: IndexMap<String, Vec<Dependent>>,
}

impl DependentsGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the graph from package manifests.
    ///
    /// Dependencies on packages outside the set and self-dependencies are
    /// skipped. Every package gets an entry, even without dependents.
    #[must_use]
    pub fn from_packages(packages: &[PackageInfo]) -> Self {
        let mut graph = Self::new();
        for package in packages {
            graph.dependents.entry(package.name.clone()).or_default();
        }

        for package in packages {
            for (dependency, declared) in &package.dependencies {
                if dependency == &package.name || !graph.dependents.contains_key(dependency) {
                    continue;
                }
                graph.add_edge(
                    dependency.clone(),
                    Dependent {
                        name: package.name.clone(),
                        kind: declared.kind,
                        range: declared.range.clone(),
                    },
                );
            }
        }

        graph
    }

    /// Records that `dependent` depends on `dependency`. Exact duplicates are
    /// ignored.
    pub fn add_edge(&mut self, dependency: impl Into<String>, dependent: Dependent) {
        let entry = self.dependents.entry(dependency.into()).or_default();
        if !entry.contains(&dependent) {
            entry.push(dependent);
        }
    }

    #[must_use]
    pub fn dependents_of(&self, name: &str) -> &[Dependent] {
        self.dependents.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Dependent])> {
        self.dependents
            .iter()
            .map(|(name, dependents)| (name.as_str(), dependents.as_slice()))
    }

    /// All package names the graph mentions, dependencies first.
    pub(crate) fn referenced_names(&self) -> impl Iterator<Item = &str> {
        self.iter().flat_map(|(name, dependents)| {
            std::iter::once(name).chain(dependents.iter().map(|d| d.name.as_str()))
        })
    }

    /// Parses every declared range, resolving `workspace:` ranges against
    /// the dependency's current version.
    ///
    /// Names must already be known to `packages`.
    pub(crate) fn resolve<'g>(
        &'g self,
        packages: &PackageSet<'_>,
    ) -> Result<ResolvedGraph<'g>, PlanError> {
        let mut edges = IndexMap::with_capacity(self.dependents.len());

        for (dependency, dependents) in &self.dependents {
            let Some(package) = packages.get(dependency) else {
                continue;
            };
            let resolved = dependents
                .iter()
                .map(|dependent| {
                    VersionRange::parse_declared(&dependent.range, &package.version)
                        .map(|range| ResolvedEdge {
                            dependent: dependent.name.as_str(),
                            kind: dependent.kind,
                            range,
                        })
                        .map_err(|source| PlanError::InvalidRange {
                            dependent: dependent.name.clone(),
                            dependency: dependency.clone(),
                            range: dependent.range.clone(),
                            source,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            edges.insert(dependency.as_str(), resolved);
        }

        Ok(ResolvedGraph { edges })
    }
}

#[derive(Debug)]
pub(crate) struct ResolvedEdge<'g> {
    pub(crate) dependent: &'g str,
    pub(crate) kind: DependencyKind,
    pub(crate) range: VersionRange,
}

/// Dependents graph with parsed ranges, as used during planning.
#[derive(Debug, Default)]
pub(crate) struct ResolvedGraph<'g> {
    edges: IndexMap<&'g str, Vec<ResolvedEdge<'g>>>,
}

impl<'g> ResolvedGraph<'g> {
    pub(crate) fn dependents_of(&self, name: &str) -> &[ResolvedEdge<'g>] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Forward view: dependent name to the names it depends on.
    pub(crate) fn dependencies(&self) -> IndexMap<&'g str, Vec<&'g str>> {
        let mut forward: IndexMap<&'g str, Vec<&'g str>> = IndexMap::new();
        for (dependency, edges) in &self.edges {
            for edge in edges {
                let entry = forward.entry(edge.dependent).or_default();
                if !entry.contains(dependency) {
                    entry.push(*dependency);
                }
            }
        }
        forward
    }
}
