//! Package registry owned by a resource set.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use super::metamodel::{Classifier, Package};

/// Maps namespace URIs to metamodel packages.
///
/// There is no process-wide registry: each [`ResourceSet`](crate::resource::ResourceSet)
/// owns one, handed in at construction.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    packages: IndexMap<SmolStr, Arc<Package>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package, replacing any package with the same namespace URI.
    pub fn register(&mut self, package: Arc<Package>) -> Option<Arc<Package>> {
        self.packages
            .insert(SmolStr::new(package.ns_uri()), package)
    }

    /// Register a package unless its namespace URI is already taken.
    ///
    /// Returns `true` if the package was added.
    pub fn register_if_absent(&mut self, package: Arc<Package>) -> bool {
        if self.packages.contains_key(package.ns_uri()) {
            return false;
        }
        debug!("registering package '{}'", package.ns_uri());
        self.register(package);
        true
    }

    pub fn get(&self, ns_uri: &str) -> Option<&Arc<Package>> {
        self.packages.get(ns_uri)
    }

    pub fn contains(&self, ns_uri: &str) -> bool {
        self.packages.contains_key(ns_uri)
    }

    /// Find a classifier by name across all packages, in registration order.
    pub fn find_classifier(&self, name: &str) -> Option<&Arc<Classifier>> {
        self.packages.values().find_map(|p| p.classifier(name))
    }

    pub fn packages(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.packages.values()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
