use std::collections::{HashSet, VecDeque};

use changeset_core::{BumpType, DependencyKind};
use semver::Version;
use tracing::debug;

use crate::error::Result;
use crate::graph::{ResolvedEdge, ResolvedGraph};
use crate::intent::IntentMap;
use crate::packages::PackageSet;

/// The bump a dependent is forced to take when its dependency is released
/// with `bump` at `new_version`.
fn forced_bump(
    bump: Option<BumpType>,
    new_version: &Version,
    edge: &ResolvedEdge<'_>,
) -> Option<BumpType> {
    if edge.kind == DependencyKind::Peer && matches!(bump, Some(BumpType::Minor | BumpType::Major))
    {
        return Some(BumpType::Major);
    }
    (!edge.range.matches(new_version)).then_some(BumpType::Patch)
}

/// Pushes forced bumps from every released package to its dependents,
/// transitively.
///
/// Packages are processed breadth-first starting from all current releases.
/// A package is queued again whenever its bump kind increases. Changeset
/// provenance is never added by this pass.
///
/// Returns `true` if any intent gained or increased a bump, or an error if a
/// forced bump overflows the dependent's version.
pub(crate) fn propagate_dependents(
    intents: &mut IntentMap,
    graph: &ResolvedGraph<'_>,
    packages: &PackageSet<'_>,
) -> Result<bool> {
    let mut queue: VecDeque<String> = intents
        .releases()
        .map(|intent| intent.name().to_string())
        .collect();
    let mut queued: HashSet<String> = queue.iter().cloned().collect();
    let mut changed = false;

    while let Some(name) = queue.pop_front() {
        queued.remove(&name);
        let Some(intent) = intents.get(&name).filter(|intent| intent.is_release()) else {
            continue;
        };
        let bump = intent.bump_type();
        let new_version = intent.new_version();

        for edge in graph.dependents_of(&name) {
            let Some(forced) = forced_bump(bump, &new_version, edge) else {
                continue;
            };
            let Some(dependent) = packages.get(edge.dependent) else {
                continue;
            };
            if !intents.touch(dependent).raise_bump(forced)? {
                continue;
            }

            debug!(
                dependent = edge.dependent,
                dependency = %name,
                kind = %edge.kind,
                range = %edge.range,
                bump = %forced,
                "forced dependent bump"
            );
            changed = true;
            if queued.insert(edge.dependent.to_string()) {
                queue.push_back(edge.dependent.to_string());
            }
        }
    }

    Ok(changed)
}
