mod config;
mod error;
mod manifest;

pub const DEFAULT_CHANGESET_DIR: &str = ".changeset";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

pub use config::{Access, ChangelogGenerator, ChangesetConfig, read_config};
pub use error::ProjectError;

pub type Result<T> = std::result::Result<T, ProjectError>;
