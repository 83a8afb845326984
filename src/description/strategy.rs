//! Export and reference policy used when describing a resource.

use super::reference::{ExportedObject, ReferenceDescription};
use crate::base::Uri;
use crate::model::{FeatureDef, NodeRef, Reference};
use crate::naming::{QualifiedName, QualifiedNameProvider, SimpleNameProvider};

/// Whether derived (but stored) reference features are described.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DerivedReferences {
    #[default]
    Include,
    Exclude,
}

/// Options of [`DefaultResourceDescriptionStrategy`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DescriptionPolicy {
    pub derived: DerivedReferences,
}

/// Decides what a resource exports and which of its references are
/// recorded.
///
/// The callbacks run once per node during a pre-order walk. Returning
/// `false` from a `create_*` callback skips the node's subtree for that walk.
pub trait ResourceDescriptionStrategy: Send + Sync {
    /// The name `node` is exported under, if any.
    fn qualified_name(&self, node: NodeRef<'_>) -> Option<QualifiedName>;

    fn is_exported(&self, node: NodeRef<'_>) -> bool {
        self.qualified_name(node).is_some()
    }

    fn create_exported_objects(
        &self,
        node: NodeRef<'_>,
        emit: &mut dyn FnMut(ExportedObject),
    ) -> bool {
        if let (Some(name), Some(uri)) = (self.qualified_name(node), node.uri()) {
            emit(ExportedObject::new(name, uri, node.classifier().name()));
        }
        true
    }

    /// Whether values of `feature` may be described at all.
    fn is_interesting(&self, feature: &FeatureDef) -> bool {
        is_indexable(feature)
    }

    /// Emit one description per bound value of every interesting reference
    /// feature of `node`.
    ///
    /// Values of cross-reference features are only described when the
    /// target lies in another resource: a local target is recomputed from
    /// the text by the linker. Values of plain reference features are always
    /// described.
    fn create_reference_descriptions(
        &self,
        node: NodeRef<'_>,
        container: Option<&Uri>,
        emit: &mut dyn FnMut(ReferenceDescription),
    ) -> bool {
        let Some(source) = node.uri() else {
            return true;
        };
        for (_, feature, values) in node.reference_slots() {
            if !self.is_interesting(feature) {
                continue;
            }
            for (index, value) in values.iter().enumerate() {
                let Reference::Bound(target) = value else {
                    continue;
                };
                let external = !target.is_in(node.resource_uri());
                if external || !feature.is_cross_reference() {
                    emit(ReferenceDescription::new(
                        source.clone(),
                        target.clone(),
                        feature.name(),
                        feature.is_many().then_some(index),
                        container.cloned(),
                    ));
                }
            }
        }
        true
    }
}

/// Non-containment references whose values are persisted state.
pub fn is_indexable(feature: &FeatureDef) -> bool {
    feature.is_reference() && !feature.is_transient() && !feature.is_volatile()
}

/// Exports every node its naming policy can name.
#[derive(Clone, Debug, Default)]
pub struct DefaultResourceDescriptionStrategy<N = SimpleNameProvider> {
    naming: N,
    policy: DescriptionPolicy,
}

impl<N: QualifiedNameProvider> DefaultResourceDescriptionStrategy<N> {
    pub fn new(naming: N) -> Self {
        Self {
            naming,
            policy: DescriptionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DescriptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DescriptionPolicy {
        self.policy
    }
}

impl<N: QualifiedNameProvider> ResourceDescriptionStrategy for DefaultResourceDescriptionStrategy<N> {
    fn qualified_name(&self, node: NodeRef<'_>) -> Option<QualifiedName> {
        self.naming.qualified_name(node)
    }

    fn is_interesting(&self, feature: &FeatureDef) -> bool {
        if self.policy.derived == DerivedReferences::Exclude && feature.is_derived() {
            return false;
        }
        is_indexable(feature)
    }
}
