//! A collection of resources sharing one reference-resolution scope.

use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::language::LanguageRegistry;
use super::resource::{ParseResult, Resource};
use crate::base::{ResourceUri, Uri};
use crate::model::{NodeRef, Registry, Tree};
use crate::project::ResourceLoader;
use crate::{Error, Result};

/// Owns resources and dereferences URIs across them.
///
/// Iteration follows insertion order, so every walk over the set (linking,
/// description computation, scoping) is deterministic for a given membership.
pub struct ResourceSet {
    resources: IndexMap<ResourceUri, Resource>,
    registry: Registry,
    languages: LanguageRegistry,
    loader: Option<Box<dyn ResourceLoader>>,
}

impl ResourceSet {
    pub fn new(registry: Registry, languages: LanguageRegistry) -> Self {
        Self {
            resources: IndexMap::new(),
            registry,
            languages,
            loader: None,
        }
    }

    /// Enable demand loading of resources that are not in the set yet.
    pub fn with_loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
        self.set_loader(loader);
        self
    }

    pub fn set_loader(&mut self, loader: impl ResourceLoader + 'static) {
        self.loader = Some(Box::new(loader));
    }

    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    pub fn languages_mut(&mut self) -> &mut LanguageRegistry {
        &mut self.languages
    }

    // ========================================================================
    // MEMBERSHIP
    // ========================================================================

    /// Add a resource. Fails without touching the set if the URI is taken.
    pub fn add_resource(&mut self, resource: Resource) -> Result<&mut Resource> {
        if self.resources.contains_key(resource.uri()) {
            return Err(Error::DuplicateResource(resource.uri().clone()));
        }
        debug!("adding resource '{}'", resource.uri());
        let (index, _) = self.resources.insert_full(resource.uri().clone(), resource);
        Ok(&mut self.resources[index])
    }

    /// Add an empty resource whose parser is picked by file extension.
    pub fn create_resource(&mut self, uri: impl Into<ResourceUri>) -> Result<&mut Resource> {
        let uri = uri.into();
        if self.resources.contains_key(&uri) {
            return Err(Error::DuplicateResource(uri));
        }
        let parser = self
            .languages
            .parser_for(&uri)
            .cloned()
            .ok_or_else(|| Error::NoLanguage(uri.clone()))?;
        self.add_resource(Resource::with_parser(uri, parser))
    }

    /// Parse `text` into the resource at `uri`, creating it if needed.
    ///
    /// Reloading a resource first invalidates every reference other
    /// resources hold into its previous tree.
    pub fn load_resource(&mut self, uri: impl Into<ResourceUri>, text: &str) -> Result<ParseResult> {
        let uri = uri.into();
        if !self.resources.contains_key(&uri) {
            self.create_resource(uri.clone())?;
        } else if self.resources.get(&uri).is_some_and(Resource::is_loaded) {
            self.demote_references_into(&uri);
        }
        let resource = self
            .resources
            .get_mut(&uri)
            .ok_or_else(|| Error::ResourceNotFound(uri.clone()))?;
        resource.load(text)
    }

    /// Remove a resource. References into it held by other resources become
    /// unresolved again.
    pub fn remove_resource(&mut self, uri: &ResourceUri) -> Option<Resource> {
        let removed = self.resources.shift_remove(uri)?;
        debug!("removed resource '{}'", uri);
        self.demote_references_into(uri);
        Some(removed)
    }

    /// Unload a resource but keep it in the set. Returns `false` if absent.
    pub fn unload_resource(&mut self, uri: &ResourceUri) -> bool {
        let Some(resource) = self.resources.get_mut(uri) else {
            return false;
        };
        resource.unload();
        self.demote_references_into(uri);
        true
    }

    /// Mutate the tree of a loaded resource.
    ///
    /// Bound references anywhere in the set follow nodes the edit moves to
    /// their new URI; references into nodes it detaches become unresolved
    /// again. This also happens when `edit` fails after changing the tree.
    pub fn edit_resource<R>(
        &mut self,
        uri: &ResourceUri,
        edit: impl FnOnce(&mut Tree) -> Result<R>,
    ) -> Result<R> {
        let resource = self
            .resources
            .get_mut(uri)
            .ok_or_else(|| Error::ResourceNotFound(uri.clone()))?;
        let (result, relocation) = resource.edit_relocating(edit)?;
        if !relocation.is_empty() {
            let changed: usize = self
                .resources
                .values_mut()
                .filter(|r| r.uri() != uri)
                .map(|r| r.relocate_references(&relocation))
                .sum();
            if changed > 0 {
                debug!("{} references follow the edit of '{}'", changed, uri);
            }
        }
        result
    }

    fn demote_references_into(&mut self, target: &ResourceUri) {
        let demoted: usize = self
            .resources
            .values_mut()
            .filter(|r| r.uri() != target)
            .map(|r| r.demote_references_into(target))
            .sum();
        if demoted > 0 {
            debug!("{} references into '{}' are unresolved again", demoted, target);
        }
    }

    // ========================================================================
    // ACCESS
    // ========================================================================

    pub fn resource(&self, uri: &ResourceUri) -> Option<&Resource> {
        self.resources.get(uri)
    }

    pub fn contains(&self, uri: &ResourceUri) -> bool {
        self.resources.contains_key(uri)
    }

    /// Resources in insertion order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn uris(&self) -> impl Iterator<Item = &ResourceUri> {
        self.resources.keys()
    }

    pub fn resource_at(&self, index: usize) -> Option<&Resource> {
        self.resources.get_index(index).map(|(_, r)| r)
    }

    pub(crate) fn index_of(&self, uri: &ResourceUri) -> Option<usize> {
        self.resources.get_index_of(uri)
    }

    pub(crate) fn resource_at_mut(&mut self, index: usize) -> Option<&mut Resource> {
        self.resources.get_index_mut(index).map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    // ========================================================================
    // DEREFERENCE
    // ========================================================================

    /// Dereference a URI among the resources currently loaded. Never loads.
    pub fn node(&self, uri: &Uri) -> Option<NodeRef<'_>> {
        self.resources.get(uri.resource())?.resolve(uri)
    }

    /// Make sure the resource at `uri` is loaded, asking the loader for its
    /// text if it is absent or unloaded.
    pub fn ensure_loaded(&mut self, uri: &ResourceUri) -> Result<()> {
        if self.resources.get(uri).is_some_and(Resource::is_loaded) {
            return Ok(());
        }
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| Error::ResourceNotFound(uri.clone()))?;
        debug!("demand-loading resource '{}'", uri);
        let text = loader.load(uri)?;
        self.load_resource(uri.clone(), &text).map(|_| ())
    }

    /// Dereference a URI, demand-loading its resource when a loader is
    /// registered. Load failures are logged and yield `None`.
    pub fn get_node(&mut self, uri: &Uri) -> Option<NodeRef<'_>> {
        if let Err(e) = self.ensure_loaded(uri.resource()) {
            warn!("cannot dereference '{}': {}", uri, e);
            return None;
        }
        self.node(uri)
    }
}

impl Default for ResourceSet {
    fn default() -> Self {
        Self::new(Registry::new(), LanguageRegistry::new())
    }
}

impl fmt::Debug for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSet")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("registry", &self.registry)
            .field("languages", &self.languages)
            .field("loader", &self.loader.is_some())
            .finish()
    }
}
