use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChangesetError {
    #[error("unknown bump type '{0}' (expected one of: patch, minor, major)")]
    UnknownBumpType(String),

    #[error("unknown dependency kind '{0}' (expected one of: regular, dev, optional, peer)")]
    UnknownDependencyKind(String),
}

pub type Result<T> = std::result::Result<T, ChangesetError>;
