use changeset_version::VersionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("unknown package(s) referenced: {}", names.join(", "))]
    UnknownPackages { names: Vec<String> },

    #[error("invalid range '{range}' declared by '{dependent}' for dependency '{dependency}'")]
    InvalidRange {
        dependent: String,
        dependency: String,
        range: String,
        #[source]
        source: VersionError,
    },

    #[error("cannot bump '{package}'")]
    VersionOverflow {
        package: String,
        #[source]
        source: VersionError,
    },

    #[error("release plan did not converge after {iterations} iterations")]
    IterationLimit { iterations: usize },
}

pub type Result<T> = std::result::Result<T, PlanError>;
