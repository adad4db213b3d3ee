mod error;
mod range;

use changeset_core::BumpType;
use semver::Version;

pub use error::VersionError;
pub use range::{VersionRange, satisfies};

/// Combines two independently requested bumps; the more significant one wins.
///
/// `None` is the bottom of the lattice, so `combine(None, x) == x`.
#[must_use]
pub fn combine(a: Option<BumpType>, b: Option<BumpType>) -> Option<BumpType> {
    a.max(b)
}

/// Applies a bump to a version. Pre-release and build metadata are dropped.
///
/// # Errors
///
/// Returns `VersionError::Overflow` if the bumped component is already
/// `u64::MAX`.
pub fn bump_version(version: &Version, bump_type: BumpType) -> Result<Version, VersionError> {
    let next = |component: u64| {
        component.checked_add(1).ok_or_else(|| VersionError::Overflow {
            version: version.clone(),
            bump: bump_type,
        })
    };

    Ok(match bump_type {
        BumpType::Major => Version::new(next(version.major)?, 0, 0),
        BumpType::Minor => Version::new(version.major, next(version.minor)?, 0),
        BumpType::Patch => Version::new(version.major, version.minor, next(version.patch)?),
    })
}

/// # Errors
///
/// See [`bump_version`].
pub fn apply_bump(version: &Version, bump_type: Option<BumpType>) -> Result<Version, VersionError> {
    match bump_type {
        Some(bump) => bump_version(version, bump),
        None => Ok(version.clone()),
    }
}

/// Returns the smallest bump kind that describes the jump from `old` to `new`.
///
/// The result only classifies the change: `bump_version(old, kind)` is not
/// guaranteed to equal `new`. Returns `None` when `new` is not greater than
/// `old`.
#[must_use]
pub fn classify_bump(old: &Version, new: &Version) -> Option<BumpType> {
    if new <= old {
        return None;
    }
    if new.major != old.major {
        Some(BumpType::Major)
    } else if new.minor != old.minor {
        Some(BumpType::Minor)
    } else {
        Some(BumpType::Patch)
    }
}
