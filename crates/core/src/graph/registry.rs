use gnodriver_api::{PackageDescriptor, PackageId};
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Outcome of adding a descriptor to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Inserted,
    /// Same ID seen before; the new descriptor was discarded
    DuplicateId,
    /// Stored, but another package already owns its path as import target
    ShadowedPath,
}

/// All descriptors of one resolution pass.
///
/// Descriptors are kept in insertion order, which is the response order.
/// Import targets are looked up by package path; the first package to claim
/// a path keeps it.
#[derive(Debug, Default)]
pub struct PackageRegistry {
    packages: IndexMap<PackageId, PackageDescriptor>,
    by_path: IndexMap<String, PackageId>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pkg: PackageDescriptor) -> Insertion {
        if self.packages.contains_key(&pkg.id) {
            return Insertion::DuplicateId;
        }

        let outcome = match self.by_path.get(&pkg.pkg_path) {
            Some(owner) => {
                warn!(
                    pkg_path = %pkg.pkg_path,
                    kept = %owner,
                    shadowed = %pkg.id,
                    "duplicate package path"
                );
                Insertion::ShadowedPath
            }
            None => {
                self.by_path.insert(pkg.pkg_path.clone(), pkg.id.clone());
                Insertion::Inserted
            }
        };
        self.packages.insert(pkg.id.clone(), pkg);
        outcome
    }

    pub fn resolve(&self, import_path: &str) -> Option<&PackageId> {
        self.by_path.get(import_path)
    }

    pub fn get(&self, id: &PackageId) -> Option<&PackageDescriptor> {
        self.packages.get(id)
    }

    pub fn contains(&self, id: &PackageId) -> bool {
        self.packages.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Resolve every raw import against the registry. Imports with no
    /// matching package are dropped. Returns the number of dropped imports.
    pub fn link_all(&mut self) -> usize {
        let by_path = &self.by_path;
        let mut missed = 0;
        for pkg in self.packages.values_mut() {
            let raw: Vec<String> = pkg.raw_imports.iter().cloned().collect();
            for import_path in raw {
                if let Some(target) = by_path.get(&import_path) {
                    debug!(pkg = %pkg.id, path = %import_path, "found import");
                    pkg.link(&import_path, target.clone());
                }
            }
            for import_path in pkg.unresolved_imports() {
                debug!(pkg = %pkg.id, path = %import_path, "missed import");
                missed += 1;
            }
        }
        missed
    }

    pub fn into_packages(self) -> Vec<PackageDescriptor> {
        self.packages.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(id: &str, path: &str, imports: &[&str]) -> PackageDescriptor {
        let mut pkg = PackageDescriptor::new(id, path);
        pkg.raw_imports = imports.iter().map(|s| s.to_string()).collect();
        pkg
    }

    #[test]
    fn test_link_drops_missing_imports() {
        let mut registry = PackageRegistry::new();
        registry.insert(pkg("/w/a", "a", &["b/c", "z/missing"]));
        registry.insert(pkg("/w/b", "b/c", &[]));

        assert_eq!(registry.link_all(), 1);
        let a = registry.get(&PackageId::from("/w/a")).unwrap();
        assert_eq!(a.imports.get("b/c"), Some(&PackageId::from("/w/b")));
        assert!(!a.imports.contains_key("z/missing"));
    }

    #[test]
    fn test_first_path_owner_wins() {
        let mut registry = PackageRegistry::new();
        assert_eq!(registry.insert(pkg("/w/one", "x", &[])), Insertion::Inserted);
        assert_eq!(
            registry.insert(pkg("/w/two", "x", &[])),
            Insertion::ShadowedPath
        );
        assert_eq!(
            registry.insert(pkg("/w/one", "y", &[])),
            Insertion::DuplicateId
        );

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("x"), Some(&PackageId::from("/w/one")));
        assert!(registry.resolve("y").is_none());

        let ids: Vec<_> = registry
            .into_packages()
            .into_iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(ids, vec!["/w/one", "/w/two"]);
    }
}
