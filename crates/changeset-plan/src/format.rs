use std::collections::HashSet;

use changeset_core::Release;
use changeset_version::classify_bump;
use indexmap::{IndexMap, IndexSet};

use crate::graph::ResolvedGraph;
use crate::intent::{IntentMap, ReleaseIntent};

/// Released packages reachable from `start` through forward dependency
/// edges, passing through unreleased packages as well.
fn released_dependencies<'g>(
    start: &str,
    forward: &IndexMap<&'g str, Vec<&'g str>>,
    released: &IndexSet<&str>,
) -> HashSet<&'g str> {
    let mut found = HashSet::new();
    let mut visited = HashSet::new();
    let mut stack: Vec<&'g str> = forward.get(start).cloned().unwrap_or_default();

    while let Some(name) = stack.pop() {
        if !visited.insert(name) {
            continue;
        }
        if name != start && released.contains(name) {
            found.insert(name);
        }
        if let Some(next) = forward.get(name) {
            stack.extend(next.iter().copied());
        }
    }

    found
}

fn to_release(intent: &ReleaseIntent) -> Option<Release> {
    let new_version = intent.new_version();
    let bump_type = intent
        .bump_type()
        .or_else(|| classify_bump(intent.old_version(), &new_version))?;
    Some(Release {
        name: intent.name().to_string(),
        bump_type,
        old_version: intent.old_version().clone(),
        new_version,
        changesets: intent.changesets().to_vec(),
    })
}

/// Orders the converged intents into release records.
///
/// Only packages whose version actually moves are emitted. A package never
/// precedes a released package it depends on; otherwise the earliest-touched
/// ready package goes first. When only cycle members remain, the earliest
/// touched of them is emitted to break the cycle.
pub(crate) fn format_releases(intents: &IntentMap, graph: &ResolvedGraph<'_>) -> Vec<Release> {
    let released: IndexMap<&str, &ReleaseIntent> = intents
        .releases()
        .map(|intent| (intent.name(), intent))
        .collect();
    let names: IndexSet<&str> = released.keys().copied().collect();
    let forward = graph.dependencies();
    let blockers: IndexMap<&str, HashSet<&str>> = names
        .iter()
        .map(|name| (*name, released_dependencies(name, &forward, &names)))
        .collect();

    let mut remaining: IndexSet<&str> = names.clone();
    let mut emitted: HashSet<&str> = HashSet::with_capacity(names.len());
    let mut releases = Vec::with_capacity(names.len());

    while !remaining.is_empty() {
        let pending = |name: &str| {
            blockers
                .get(name)
                .map(|deps| {
                    deps.iter()
                        .copied()
                        .filter(|dep| !emitted.contains(dep))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };
        let next = remaining
            .iter()
            .copied()
            .find(|name| pending(*name).is_empty())
            .or_else(|| {
                // Cycle: only a package whose pending dependencies all depend
                // back on it may go first.
                remaining.iter().copied().find(|name| {
                    pending(*name).iter().all(|dep| {
                        blockers.get(dep).is_some_and(|deps| deps.contains(name))
                    })
                })
            })
            .or_else(|| remaining.first().copied());
        let Some(name) = next else {
            break;
        };

        remaining.shift_remove(name);
        emitted.insert(name);
        if let Some(release) = released.get(name).copied().and_then(to_release) {
            releases.push(release);
        }
    }

    releases
}
