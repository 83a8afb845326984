//! Derived, queryable view of one resource.

use tracing::trace;

use super::reference::{ExportedObject, ReferenceDescription};
use super::strategy::ResourceDescriptionStrategy;
use crate::base::{ResourceUri, Uri};
use crate::model::NodeRef;
use crate::naming::QualifiedName;
use crate::resource::Resource;

/// Exported objects, outgoing references and imported names of a resource
/// at one modification stamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceDescription {
    uri: ResourceUri,
    stamp: u64,
    exported: Vec<ExportedObject>,
    references: Vec<ReferenceDescription>,
    imported_names: Vec<QualifiedName>,
}

impl ResourceDescription {
    /// Walk the resource's tree and apply `strategy`.
    ///
    /// An unloaded resource yields an empty description.
    pub fn compute(resource: &Resource, strategy: &dyn ResourceDescriptionStrategy) -> Self {
        let mut exported = Vec::new();
        let mut references = Vec::new();

        if let Some(root) = resource.root() {
            let mut stack = vec![root];
            while let Some(node) = stack.pop() {
                if strategy.create_exported_objects(node, &mut |object| exported.push(object)) {
                    push_children(&mut stack, node, |child| child);
                }
            }

            let mut stack: Vec<(NodeRef<'_>, Option<Uri>)> = vec![(root, None)];
            while let Some((node, outer)) = stack.pop() {
                let container = if strategy.is_exported(node) {
                    node.uri()
                } else {
                    outer
                };
                let descend = strategy.create_reference_descriptions(
                    node,
                    container.as_ref(),
                    &mut |reference| references.push(reference),
                );
                if descend {
                    push_children(&mut stack, node, |child| (child, container.clone()));
                }
            }
        }

        trace!(
            "described '{}': {} exported, {} references",
            resource.uri(),
            exported.len(),
            references.len()
        );
        Self {
            uri: resource.uri().clone(),
            stamp: resource.modification_stamp(),
            exported,
            references,
            imported_names: resource.imported_names().iter().cloned().collect(),
        }
    }

    pub fn uri(&self) -> &ResourceUri {
        &self.uri
    }

    /// Stamp of the resource this description was computed from.
    pub fn modification_stamp(&self) -> u64 {
        self.stamp
    }

    /// Exported objects in tree order.
    pub fn exported_objects(&self) -> &[ExportedObject] {
        &self.exported
    }

    pub fn exported_objects_by_name<'a>(
        &'a self,
        name: &'a QualifiedName,
    ) -> impl Iterator<Item = &'a ExportedObject> {
        self.exported.iter().filter(move |o| o.name() == name)
    }

    pub fn exported_objects_by_classifier<'a>(
        &'a self,
        classifier: &'a str,
    ) -> impl Iterator<Item = &'a ExportedObject> {
        self.exported
            .iter()
            .filter(move |o| o.classifier() == classifier)
    }

    /// References in tree order, then feature declaration order, then index.
    pub fn reference_descriptions(&self) -> &[ReferenceDescription] {
        &self.references
    }

    /// Names the linker looked up for this resource.
    pub fn imported_names(&self) -> &[QualifiedName] {
        &self.imported_names
    }

    /// True if the resource references anything in `target`.
    pub fn references_resource(&self, target: &ResourceUri) -> bool {
        self.references
            .iter()
            .any(|r| r.target_uri().is_in(target))
    }

    pub fn is_empty(&self) -> bool {
        self.exported.is_empty() && self.references.is_empty()
    }
}

/// Push `node`'s children so that they pop in document order.
fn push_children<'a, T>(stack: &mut Vec<T>, node: NodeRef<'a>, wrap: impl Fn(NodeRef<'a>) -> T) {
    let children: Vec<NodeRef<'a>> = node.children().collect();
    stack.extend(children.into_iter().rev().map(wrap));
}
