use serde::Deserialize;

/// Configuration file as written by users, before validation.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct WrittenConfig {
    pub(crate) commit: Option<bool>,
    pub(crate) access: Option<String>,
    pub(crate) base_branch: Option<String>,
    pub(crate) changelog: Option<ChangelogValue>,
    pub(crate) linked: Option<Vec<Vec<String>>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ChangelogValue {
    Toggle(bool),
    Generator(String),
    GeneratorWithOptions(String, toml::Table),
}
