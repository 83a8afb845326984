//! Bidirectional index over the descriptions of many resources.
//!
//! Enables both:
//! - "Find References": given a target node, find every reference to it
//! - "Dependencies": given a resource, find the resources it references
//!
//! The index is updated one resource at a time: [`ReferenceIndex::update`]
//! replaces everything a resource contributed before.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use super::reference::{ExportedObject, ReferenceDescription};
use super::resource_description::ResourceDescription;
use crate::base::{ResourceUri, Uri};
use crate::naming::QualifiedName;

/// Position of an entry inside one resource's description.
type Entry = (ResourceUri, usize);

#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    /// Indexed descriptions, in the order resources were first added.
    descriptions: IndexMap<ResourceUri, Arc<ResourceDescription>>,

    /// Reverse index: target URI → references to it
    reverse: FxHashMap<Uri, Vec<Entry>>,

    /// Forward index: source resource → resources it references
    forward: FxHashMap<ResourceUri, FxHashSet<ResourceUri>>,

    /// Exported objects by qualified name
    exports: FxHashMap<QualifiedName, Vec<Entry>>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a resource's contribution with `description`.
    pub fn update(&mut self, description: Arc<ResourceDescription>) {
        let uri = description.uri().clone();
        self.remove_entries(&uri);
        trace!(
            "[REF_INDEX] update '{}': {} references, {} exports",
            uri,
            description.reference_descriptions().len(),
            description.exported_objects().len()
        );

        let mut targets = FxHashSet::default();
        for (i, reference) in description.reference_descriptions().iter().enumerate() {
            self.reverse
                .entry(reference.target_uri().clone())
                .or_default()
                .push((uri.clone(), i));
            targets.insert(reference.target_uri().resource().clone());
        }
        self.forward.insert(uri.clone(), targets);

        for (i, object) in description.exported_objects().iter().enumerate() {
            self.exports
                .entry(object.name().clone())
                .or_default()
                .push((uri.clone(), i));
        }

        match self.descriptions.get_mut(&uri) {
            Some(slot) => *slot = description,
            None => {
                self.descriptions.insert(uri, description);
            }
        }
    }

    /// Drop everything a resource contributed. Returns `false` if it was not
    /// indexed.
    pub fn remove_resource(&mut self, uri: &ResourceUri) -> bool {
        self.remove_entries(uri);
        self.descriptions.shift_remove(uri).is_some()
    }

    fn remove_entries(&mut self, uri: &ResourceUri) {
        if !self.descriptions.contains_key(uri) {
            return;
        }
        for entries in self.reverse.values_mut() {
            entries.retain(|(source, _)| source != uri);
        }
        self.reverse.retain(|_, entries| !entries.is_empty());

        for entries in self.exports.values_mut() {
            entries.retain(|(source, _)| source != uri);
        }
        self.exports.retain(|_, entries| !entries.is_empty());

        self.forward.remove(uri);
    }

    /// Every reference to `target`, in resource order then description order.
    pub fn find_references(&self, target: &Uri) -> Vec<&ReferenceDescription> {
        let Some(entries) = self.reverse.get(target) else {
            return Vec::new();
        };
        let mut entries: Vec<&Entry> = entries.iter().collect();
        entries.sort_by_key(|(source, i)| (self.descriptions.get_index_of(source), *i));
        entries
            .into_iter()
            .filter_map(|(source, i)| {
                self.descriptions
                    .get(source)?
                    .reference_descriptions()
                    .get(*i)
            })
            .collect()
    }

    /// Every reference into any node of `target`.
    pub fn find_references_to_resource(&self, target: &ResourceUri) -> Vec<&ReferenceDescription> {
        self.descriptions
            .values()
            .flat_map(|d| d.reference_descriptions())
            .filter(|r| r.target_uri().is_in(target))
            .collect()
    }

    /// Exported objects named `name`, in resource order.
    pub fn find_exported(&self, name: &QualifiedName) -> Vec<&ExportedObject> {
        let Some(entries) = self.exports.get(name) else {
            return Vec::new();
        };
        let mut entries: Vec<&Entry> = entries.iter().collect();
        entries.sort_by_key(|(source, i)| (self.descriptions.get_index_of(source), *i));
        entries
            .into_iter()
            .filter_map(|(source, i)| self.descriptions.get(source)?.exported_objects().get(*i))
            .collect()
    }

    /// Resources `source` references, in index order.
    pub fn referenced_resources(&self, source: &ResourceUri) -> Vec<&ResourceUri> {
        let Some(targets) = self.forward.get(source) else {
            return Vec::new();
        };
        self.descriptions
            .keys()
            .filter(|uri| targets.contains(*uri))
            .collect()
    }

    /// Resources that reference `target`, in index order.
    pub fn referencing_resources(&self, target: &ResourceUri) -> Vec<&ResourceUri> {
        self.descriptions
            .keys()
            .filter(|uri| {
                self.forward
                    .get(*uri)
                    .is_some_and(|targets| targets.contains(target))
            })
            .collect()
    }

    pub fn description(&self, uri: &ResourceUri) -> Option<&Arc<ResourceDescription>> {
        self.descriptions.get(uri)
    }

    /// Clear all entries.
    pub fn clear(&mut self) {
        self.descriptions.clear();
        self.reverse.clear();
        self.forward.clear();
        self.exports.clear();
    }

    pub fn resource_count(&self) -> usize {
        self.descriptions.len()
    }

    /// Number of distinct referenced targets.
    pub fn target_count(&self) -> usize {
        self.reverse.len()
    }

    /// Total number of indexed references.
    pub fn reference_count(&self) -> usize {
        self.reverse.values().map(Vec::len).sum()
    }
}
