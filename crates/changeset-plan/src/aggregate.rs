use changeset_core::Changeset;
use indexmap::IndexSet;
use tracing::debug;

use crate::error::PlanError;
use crate::intent::IntentMap;
use crate::packages::PackageSet;

/// Package names referenced by `changesets`, in order of appearance.
pub(crate) fn referenced_names(changesets: &[Changeset]) -> impl Iterator<Item = &str> {
    changesets
        .iter()
        .flat_map(|changeset| changeset.releases.iter().map(|r| r.name.as_str()))
}

/// Collapses changesets into one intent per package.
///
/// Each intent carries the most significant requested bump and the ids of
/// every changeset that named the package.
///
/// # Errors
///
/// Returns `PlanError::UnknownPackages` if a changeset names a package that
/// is not in `packages` and `PlanError::VersionOverflow` if a requested bump
/// cannot be applied.
pub fn aggregate_changesets(
    changesets: &[Changeset],
    packages: &PackageSet<'_>,
) -> Result<IntentMap, PlanError> {
    let unknown: IndexSet<&str> = referenced_names(changesets)
        .filter(|name| !packages.contains(name))
        .collect();
    if !unknown.is_empty() {
        return Err(PlanError::UnknownPackages {
            names: unknown.into_iter().map(str::to_string).collect(),
        });
    }

    let mut intents = IntentMap::new();
    for changeset in changesets {
        for release in &changeset.releases {
            let Some(package) = packages.get(&release.name) else {
                continue;
            };
            let intent = intents.touch(package);
            intent.raise_bump(release.bump_type)?;
            intent.record_changeset(&changeset.id);
        }
    }

    debug!(
        changesets = changesets.len(),
        packages = intents.len(),
        "aggregated changesets"
    );
    Ok(intents)
}
