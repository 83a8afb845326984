use std::sync::Arc;

use super::QualifiedName;
use crate::model::NodeRef;

/// Computes the name a node is exported under.
pub trait QualifiedNameProvider: Send + Sync {
    /// `None` means the node is not addressable by name.
    fn qualified_name(&self, node: NodeRef<'_>) -> Option<QualifiedName>;
}

impl<T: QualifiedNameProvider + ?Sized> QualifiedNameProvider for Arc<T> {
    fn qualified_name(&self, node: NodeRef<'_>) -> Option<QualifiedName> {
        (**self).qualified_name(node)
    }
}

impl<T: QualifiedNameProvider + ?Sized> QualifiedNameProvider for &T {
    fn qualified_name(&self, node: NodeRef<'_>) -> Option<QualifiedName> {
        (**self).qualified_name(node)
    }
}

/// The node's own `name` attribute as a single segment.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleNameProvider;

impl QualifiedNameProvider for SimpleNameProvider {
    fn qualified_name(&self, node: NodeRef<'_>) -> Option<QualifiedName> {
        node.name().map(QualifiedName::single)
    }
}

/// The names of all named ancestors followed by the node's own name.
///
/// Unnamed ancestors (e.g. the model root) contribute nothing; an unnamed
/// node has no qualified name.
#[derive(Clone, Copy, Debug, Default)]
pub struct NestedNameProvider;

impl QualifiedNameProvider for NestedNameProvider {
    fn qualified_name(&self, node: NodeRef<'_>) -> Option<QualifiedName> {
        let own = node.name()?;
        let mut segments: Vec<&str> = node.ancestors().filter_map(|a| a.name()).collect();
        segments.reverse();
        segments.push(own);
        Some(QualifiedName::new(segments))
    }
}
