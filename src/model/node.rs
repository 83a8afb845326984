//! Borrowed view of one node.

use std::fmt;
use std::sync::Arc;

use super::metamodel::{Classifier, FeatureDef, FeatureId};
use super::tree::{NodeId, Tree};
use super::value::{Reference, Value};
use crate::base::constants::NAME_FEATURE;
use crate::base::{Fragment, ResourceUri, TextRange, Uri};

/// A node together with the tree and resource it lives in.
///
/// This is what naming policies, scope providers and description strategies
/// see: enough to read the node's features, walk to its container and
/// compute its URI, without access to mutation.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    resource: &'a ResourceUri,
    id: NodeId,
    classifier: &'a Arc<Classifier>,
}

impl<'a> NodeRef<'a> {
    /// Returns `None` if `id` is not a node of `tree`.
    pub fn new(tree: &'a Tree, resource: &'a ResourceUri, id: NodeId) -> Option<Self> {
        let classifier = tree.classifier(id)?;
        Some(Self {
            tree,
            resource,
            id,
            classifier,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    pub fn resource_uri(&self) -> &'a ResourceUri {
        self.resource
    }

    pub fn classifier(&self) -> &'a Arc<Classifier> {
        self.classifier
    }

    pub fn fragment(&self) -> Option<Fragment> {
        self.tree.fragment(self.id)
    }

    /// The node's URI, or `None` if it is detached from the root.
    pub fn uri(&self) -> Option<Uri> {
        self.fragment().map(|f| self.resource.with_fragment(f))
    }

    pub fn attribute(&self, feature: &str) -> Option<&'a Value> {
        self.tree.attribute(self.id, feature)
    }

    /// The non-empty `name` attribute, if the classifier has one.
    pub fn name(&self) -> Option<&'a str> {
        self.attribute(NAME_FEATURE)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn container(&self) -> Option<NodeRef<'a>> {
        let (parent, _) = self.tree.container(self.id)?;
        NodeRef::new(self.tree, self.resource, parent)
    }

    /// Containers from the direct parent up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'a>> {
        std::iter::successors(self.container(), |node| node.container())
    }

    /// Direct children in feature declaration order.
    pub fn children(self) -> impl Iterator<Item = NodeRef<'a>> {
        let tree = self.tree;
        let resource = self.resource;
        tree.contents(self.id)
            .filter_map(move |child| NodeRef::new(tree, resource, child))
    }

    pub fn references(&self, feature: &str) -> &'a [Reference] {
        self.tree.references(self.id, feature)
    }

    /// Every reference feature with its values, in declaration order.
    pub fn reference_slots(self) -> impl Iterator<Item = (FeatureId, &'a FeatureDef, &'a [Reference])> {
        self.tree.reference_slots(self.id)
    }

    pub fn range(&self) -> Option<TextRange> {
        self.tree.range(self.id)
    }

    pub fn is_a(&self, classifier: &str) -> bool {
        self.classifier.conforms_to(classifier)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("resource", &self.resource.as_str())
            .field("id", &self.id)
            .field("classifier", &self.classifier.name())
            .field("name", &self.name())
            .finish()
    }
}
