use changeset_core::{Changeset, LinkedGroup, PackageInfo, ReleasePlan};
use changeset_project::ChangesetConfig;
use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::aggregate::{aggregate_changesets, referenced_names};
use crate::error::PlanError;
use crate::format::format_releases;
use crate::graph::{DependentsGraph, ResolvedGraph};
use crate::intent::IntentMap;
use crate::linked::align_linked;
use crate::packages::PackageSet;
use crate::propagate::propagate_dependents;

const MIN_ITERATIONS: usize = 16;

/// Planning options taken from the project configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanConfig {
    pub linked: Vec<LinkedGroup>,
}

impl From<&ChangesetConfig> for PlanConfig {
    fn from(config: &ChangesetConfig) -> Self {
        Self {
            linked: config.linked().to_vec(),
        }
    }
}

/// Assembles the release plan for a set of changesets.
///
/// Every input is checked before planning starts, so a failure never leaves
/// a partial plan behind.
///
/// # Errors
///
/// Returns `PlanError::UnknownPackages` if a changeset, a graph edge or a
/// linked group names a package missing from `packages`,
/// `PlanError::InvalidRange` if a declared range cannot be parsed,
/// `PlanError::VersionOverflow` if a bump pushes a version component past
/// `u64::MAX` and `PlanError::IterationLimit` if planning fails to settle.
pub fn assemble(
    changesets: &[Changeset],
    packages: &[PackageInfo],
    dependents: &DependentsGraph,
    config: &PlanConfig,
) -> Result<ReleasePlan, PlanError> {
    let packages = PackageSet::new(packages);
    validate_references(changesets, dependents, &config.linked, &packages)?;
    let graph = dependents.resolve(&packages)?;

    let mut intents = aggregate_changesets(changesets, &packages)?;
    let iterations = converge(&mut intents, &graph, &config.linked, &packages)?;
    let releases = format_releases(&intents, &graph);

    debug!(iterations, releases = releases.len(), "assembled release plan");
    Ok(ReleasePlan {
        changesets: changesets.to_vec(),
        releases,
    })
}

fn validate_references(
    changesets: &[Changeset],
    dependents: &DependentsGraph,
    linked: &[LinkedGroup],
    packages: &PackageSet<'_>,
) -> Result<(), PlanError> {
    let unknown: IndexSet<&str> = referenced_names(changesets)
        .chain(dependents.referenced_names())
        .chain(linked.iter().flatten().map(String::as_str))
        .filter(|name| !packages.contains(name))
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(PlanError::UnknownPackages {
            names: unknown.into_iter().map(str::to_string).collect(),
        })
    }
}

fn iteration_limit(packages: usize, groups: usize) -> usize {
    MIN_ITERATIONS.max((packages + 1) * (groups + 1) * 4)
}

/// Alternates propagation and alignment until neither changes anything.
/// Returns the number of passes taken.
fn converge(
    intents: &mut IntentMap,
    graph: &ResolvedGraph<'_>,
    linked: &[LinkedGroup],
    packages: &PackageSet<'_>,
) -> Result<usize, PlanError> {
    let limit = iteration_limit(packages.len(), linked.len());

    for iteration in 1..=limit {
        let propagated = propagate_dependents(intents, graph, packages)?;
        let aligned = align_linked(intents, linked, packages)?;
        trace!(iteration, propagated, aligned, "planning pass");
        if !propagated && !aligned {
            return Ok(iteration);
        }
    }

    Err(PlanError::IterationLimit { iterations: limit })
}

/// Plans releases for a workspace, deriving the dependents graph from the
/// package manifests.
#[derive(Debug, Clone)]
pub struct ReleasePlanner<'a> {
    packages: &'a [PackageInfo],
    config: PlanConfig,
}

impl<'a> ReleasePlanner<'a> {
    #[must_use]
    pub fn new(packages: &'a [PackageInfo]) -> Self {
        Self {
            packages,
            config: PlanConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: PlanConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds one linked group.
    #[must_use]
    pub fn linked<I, S>(mut self, group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .linked
            .push(group.into_iter().map(Into::into).collect());
        self
    }

    /// # Errors
    ///
    /// See [`assemble`].
    pub fn plan(&self, changesets: &[Changeset]) -> Result<ReleasePlan, PlanError> {
        let dependents = DependentsGraph::from_packages(self.packages);
        assemble(changesets, self.packages, &dependents, &self.config)
    }
}
