//! Hand-built graphs over a small metamodel with every kind of reference
//! feature, for cases the types language cannot express.

use std::sync::Arc;

use loom::Uri;
use loom::model::{Classifier, FeatureDef, NodeId, Reference, Tree};
use loom::resource::Resource;

pub const CHILDREN: &str = "children";
pub const REF: &str = "ref";
pub const REFS: &str = "refs";
pub const TRANSIENT_REF: &str = "transientRef";
pub const VOLATILE_REF: &str = "volatileRef";
pub const DERIVED_REF: &str = "derivedRef";
pub const LINK: &str = "link";

/// `Node` classifier: a name, contained children, and one reference feature
/// per flavour.
pub fn node_classifier() -> Arc<Classifier> {
    Classifier::builder("Node")
        .feature(FeatureDef::attribute("name"))
        .feature(FeatureDef::containment(CHILDREN, "Node").many())
        .feature(FeatureDef::reference(REF, "Node"))
        .feature(FeatureDef::reference(REFS, "Node").many())
        .feature(FeatureDef::reference(TRANSIENT_REF, "Node").transient())
        .feature(FeatureDef::reference(VOLATILE_REF, "Node").volatile())
        .feature(FeatureDef::reference(DERIVED_REF, "Node").derived())
        .feature(FeatureDef::reference(LINK, "Node").cross_reference())
        .build()
}

/// An unnamed root with one named child per entry of `names`.
///
/// Returns the tree and the children's ids in order.
pub fn flat_tree(names: &[&str]) -> (Tree, Vec<NodeId>) {
    let classifier = node_classifier();
    let mut tree = Tree::new();
    let root = tree.create_node(&classifier);
    tree.set_root(root).unwrap();

    let mut children = Vec::new();
    for name in names {
        let child = tree.create_node(&classifier);
        tree.set_attribute(child, "name", *name).unwrap();
        tree.attach(root, CHILDREN, None, child).unwrap();
        children.push(child);
    }
    (tree, children)
}

/// A loaded resource holding [`flat_tree`].
pub fn flat_resource(uri: &str, names: &[&str]) -> (Resource, Vec<NodeId>) {
    let (tree, children) = flat_tree(names);
    (Resource::from_tree(uri, tree), children)
}

/// Bind `feature` of `source` to `target` directly, bypassing the linker.
pub fn bind(resource: &mut Resource, source: NodeId, feature: &str, target: Uri) {
    resource
        .edit(|tree| tree.add_reference(source, feature, Reference::Bound(target)))
        .expect("resource should be loaded");
}

/// Fragment of the `index`-th child of a [`flat_tree`] root.
pub fn child_fragment(index: usize) -> String {
    format!("//@{CHILDREN}.{index}")
}
