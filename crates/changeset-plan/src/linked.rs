use changeset_core::{LinkedGroup, PackageInfo};
use changeset_version::classify_bump;
use tracing::debug;

use crate::error::Result;
use crate::intent::IntentMap;
use crate::packages::PackageSet;

/// Brings every member of each linked group up to the group's highest
/// planned version.
///
/// Groups without a released member are left alone, so linking never causes
/// a release on its own. Lagging members get a version override and their
/// bump kind raised to classify the jump. Changeset provenance is untouched.
///
/// Returns `true` if any override was introduced or raised.
pub(crate) fn align_linked(
    intents: &mut IntentMap,
    linked: &[LinkedGroup],
    packages: &PackageSet<'_>,
) -> Result<bool> {
    let mut changed = false;

    for group in linked {
        let members: Vec<&PackageInfo> =
            group.iter().filter_map(|name| packages.get(name)).collect();
        if !members.iter().any(|member| intents.is_released(&member.name)) {
            continue;
        }
        let Some(target) = members
            .iter()
            .map(|member| intents.tentative_version(member))
            .max()
        else {
            continue;
        };

        for member in members {
            if intents.tentative_version(member) >= target {
                continue;
            }
            let intent = intents.touch(member);
            if !intent.raise_override(&target) {
                continue;
            }
            if let Some(bump) = classify_bump(&member.version, &target) {
                intent.raise_bump(bump)?;
            }
            debug!(package = %member.name, version = %target, "aligned linked package");
            changed = true;
        }
    }

    Ok(changed)
}
