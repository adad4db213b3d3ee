use changeset_core::PackageInfo;
use indexmap::IndexMap;

/// Workspace packages indexed by name, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct PackageSet<'a> {
    packages: IndexMap<&'a str, &'a PackageInfo>,
}

impl<'a> PackageSet<'a> {
    #[must_use]
    pub fn new(packages: &'a [PackageInfo]) -> Self {
        let mut index = IndexMap::with_capacity(packages.len());
        for package in packages {
            index.entry(package.name.as_str()).or_insert(package);
        }
        Self { packages: index }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a PackageInfo> {
        self.packages.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a PackageInfo> + '_ {
        self.packages.values().copied()
    }
}
