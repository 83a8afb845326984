use crate::base::Uri;
use crate::model::{FeatureDef, NodeRef};
use crate::naming::{QualifiedName, QualifiedNameProvider, SimpleNameProvider};
use crate::resource::ResourceSet;

/// Answers "which nodes does this name denote from here?".
pub trait ScopeProvider: Send + Sync {
    /// Candidate targets for `name` written in `feature` of `from`, best
    /// first. Candidates are expected to conform to the feature's target
    /// type; the linker checks again and skips those that don't.
    fn lookup(
        &self,
        set: &ResourceSet,
        from: NodeRef<'_>,
        feature: &FeatureDef,
        name: &QualifiedName,
    ) -> Vec<Uri>;
}

/// Scope over every loaded resource of the set.
///
/// The source's own resource is searched first, then the others in set
/// order; within a resource nodes are visited in pre-order. A node matches
/// when its qualified name equals the looked-up name and its classifier
/// conforms to the feature's target type.
#[derive(Clone, Debug, Default)]
pub struct GlobalScopeProvider<N = SimpleNameProvider> {
    naming: N,
}

impl<N: QualifiedNameProvider> GlobalScopeProvider<N> {
    pub fn new(naming: N) -> Self {
        Self { naming }
    }

    pub fn naming(&self) -> &N {
        &self.naming
    }
}

impl<N: QualifiedNameProvider> ScopeProvider for GlobalScopeProvider<N> {
    fn lookup(
        &self,
        set: &ResourceSet,
        from: NodeRef<'_>,
        feature: &FeatureDef,
        name: &QualifiedName,
    ) -> Vec<Uri> {
        let local = set.resource(from.resource_uri());
        let others = set.resources().filter(|r| r.uri() != from.resource_uri());

        local
            .into_iter()
            .chain(others)
            .filter(|r| r.is_loaded())
            .flat_map(|r| r.contents())
            .filter(|node| feature.target_type().is_none_or(|t| node.is_a(t)))
            .filter(|node| self.naming.qualified_name(*node).as_ref() == Some(name))
            .filter_map(|node| node.uri())
            .collect()
    }
}
