//! Per-resource description cache.

use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use super::delta::Delta;
use super::resource_description::ResourceDescription;
use super::strategy::ResourceDescriptionStrategy;
use crate::base::ResourceUri;
use crate::naming::QualifiedName;
use crate::resource::{Resource, ResourceSet};

/// Computes resource descriptions and caches them by modification stamp.
///
/// A cached description is reused as long as its resource's stamp is
/// unchanged; any load, unload or binding in the resource produces a new
/// stamp and thus a recomputation on the next request.
pub struct DescriptionManager {
    strategy: Arc<dyn ResourceDescriptionStrategy>,
    cache: RwLock<FxHashMap<ResourceUri, Arc<ResourceDescription>>>,
}

impl DescriptionManager {
    pub fn new(strategy: impl ResourceDescriptionStrategy + 'static) -> Self {
        Self::with_shared_strategy(Arc::new(strategy))
    }

    pub fn with_shared_strategy(strategy: Arc<dyn ResourceDescriptionStrategy>) -> Self {
        Self {
            strategy,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn strategy(&self) -> &dyn ResourceDescriptionStrategy {
        self.strategy.as_ref()
    }

    /// The description of `resource` at its current stamp.
    pub fn description(&self, resource: &Resource) -> Arc<ResourceDescription> {
        if let Some(cached) = self.cached(resource.uri()) {
            if cached.modification_stamp() == resource.modification_stamp() {
                trace!("description cache hit for '{}'", resource.uri());
                return cached;
            }
        }

        let description = Arc::new(ResourceDescription::compute(resource, self.strategy.as_ref()));
        self.cache
            .write()
            .insert(resource.uri().clone(), Arc::clone(&description));
        description
    }

    /// Describe every resource of the set in parallel. Results follow set
    /// order.
    pub fn describe_all(&self, set: &ResourceSet) -> Vec<Arc<ResourceDescription>> {
        let resources: Vec<&Resource> = set.resources().collect();
        debug!("describing {} resources", resources.len());
        resources
            .par_iter()
            .map(|resource| self.description(resource))
            .collect()
    }

    /// The cached description, whatever its stamp.
    pub fn cached(&self, uri: &ResourceUri) -> Option<Arc<ResourceDescription>> {
        self.cache.read().get(uri).cloned()
    }

    /// Drop the cached description of one resource.
    pub fn invalidate(&self, uri: &ResourceUri) -> bool {
        self.cache.write().remove(uri).is_some()
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }

    pub fn cached_count(&self) -> usize {
        self.cache.read().len()
    }

    /// Recompute a resource's description and report what changed since the
    /// cached one.
    pub fn create_delta(&self, resource: &Resource) -> Delta {
        let old = self.cached(resource.uri());
        let new = self.description(resource);
        Delta::new(resource.uri().clone(), old, Some(new))
    }

    /// Forget a removed resource and report its disappearance.
    pub fn removal_delta(&self, uri: &ResourceUri) -> Delta {
        let old = self.cache.write().remove(uri);
        Delta::new(uri.clone(), old, None)
    }

    /// True if `candidate` may need relinking after `deltas`.
    ///
    /// That is the case when it imports a name some changed resource exports
    /// (before or after the change), or when it references into a changed
    /// resource. A resource is never affected by its own delta.
    pub fn is_affected(&self, deltas: &[Delta], candidate: &ResourceDescription) -> bool {
        let changed: Vec<&Delta> = deltas
            .iter()
            .filter(|d| d.has_changes() && &d.uri != candidate.uri())
            .collect();
        if changed.is_empty() {
            return false;
        }

        let exported_names: FxHashSet<&QualifiedName> = changed
            .iter()
            .flat_map(|d| d.exported_objects())
            .map(|o| o.name())
            .collect();
        if candidate
            .imported_names()
            .iter()
            .any(|name| exported_names.contains(name))
        {
            return true;
        }

        changed
            .iter()
            .any(|d| candidate.references_resource(&d.uri))
    }
}

impl std::fmt::Debug for DescriptionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptionManager")
            .field("cached", &self.cached_count())
            .finish()
    }
}
