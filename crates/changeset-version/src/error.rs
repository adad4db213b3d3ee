use changeset_core::BumpType;
use semver::Version;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("invalid version range '{range}'")]
    InvalidRange {
        range: String,
        #[source]
        source: semver::Error,
    },

    #[error("invalid version range '{range}': {reason}")]
    MalformedRange { range: String, reason: &'static str },

    #[error("{bump} bump of {version} overflows a version component")]
    Overflow { version: Version, bump: BumpType },
}
