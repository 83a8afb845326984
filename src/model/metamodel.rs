//! Metamodel: classifiers, their structural features, and packages.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

/// Index of a feature in a classifier's full (inherited + own) feature list.
///
/// Feature ids follow declaration order: inherited features first, in the
/// order of the super types, then the classifier's own features.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(u32);

impl FeatureId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a feature stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Scalar data.
    Attribute,
    /// Owned child nodes.
    Containment,
    /// Weak links to other nodes, possibly in other resources.
    Reference,
}

/// A structural feature of a classifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureDef {
    name: SmolStr,
    kind: FeatureKind,
    many: bool,
    target: Option<SmolStr>,
    transient: bool,
    volatile: bool,
    derived: bool,
    cross_reference: bool,
}

impl FeatureDef {
    fn new(name: impl Into<SmolStr>, kind: FeatureKind, target: Option<SmolStr>) -> Self {
        Self {
            name: name.into(),
            kind,
            many: false,
            target,
            transient: false,
            volatile: false,
            derived: false,
            cross_reference: false,
        }
    }

    /// A single-valued attribute.
    pub fn attribute(name: impl Into<SmolStr>) -> Self {
        Self::new(name, FeatureKind::Attribute, None)
    }

    /// A single-valued containment of nodes conforming to `target`.
    pub fn containment(name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        Self::new(name, FeatureKind::Containment, Some(target.into()))
    }

    /// A single-valued non-containment reference to nodes conforming to `target`.
    pub fn reference(name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        Self::new(name, FeatureKind::Reference, Some(target.into()))
    }

    /// Make the feature multi-valued.
    pub fn many(mut self) -> Self {
        self.many = true;
        self
    }

    /// Values are not part of the persisted state.
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Values are computed on access, not stored.
    pub fn volatile(mut self) -> Self {
        self.volatile = true;
        self
    }

    /// Values are derived from other features.
    pub fn derived(mut self) -> Self {
        self.derived = true;
        self
    }

    /// Values are written as names in the source text and bound by the linker.
    ///
    /// A local target of such a reference can always be recomputed from the
    /// text, so it is not recorded in resource descriptions.
    pub fn cross_reference(mut self) -> Self {
        self.cross_reference = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn is_many(&self) -> bool {
        self.many
    }

    /// Name of the classifier values must conform to.
    pub fn target_type(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }

    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    pub fn is_derived(&self) -> bool {
        self.derived
    }

    pub fn is_cross_reference(&self) -> bool {
        self.cross_reference
    }

    pub fn is_containment(&self) -> bool {
        self.kind == FeatureKind::Containment
    }

    /// True for non-containment references.
    pub fn is_reference(&self) -> bool {
        self.kind == FeatureKind::Reference
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// The type of a node.
#[derive(Debug, PartialEq, Eq)]
pub struct Classifier {
    name: SmolStr,
    super_types: Vec<Arc<Classifier>>,
    /// Inherited features first, then own features.
    features: Vec<FeatureDef>,
}

impl Classifier {
    /// Start building a classifier.
    pub fn builder(name: impl Into<SmolStr>) -> ClassifierBuilder {
        ClassifierBuilder {
            name: name.into(),
            super_types: Vec::new(),
            features: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn super_types(&self) -> &[Arc<Classifier>] {
        &self.super_types
    }

    /// All features, inherited ones first.
    pub fn features(&self) -> impl Iterator<Item = (FeatureId, &FeatureDef)> {
        self.features
            .iter()
            .enumerate()
            .map(|(i, f)| (FeatureId::new(i as u32), f))
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn feature(&self, id: FeatureId) -> Option<&FeatureDef> {
        self.features.get(id.index())
    }

    /// Look up a feature by name.
    pub fn feature_by_name(&self, name: &str) -> Option<(FeatureId, &FeatureDef)> {
        self.features().find(|(_, f)| f.name() == name)
    }

    /// True if this classifier is `name` or transitively extends it.
    pub fn conforms_to(&self, name: &str) -> bool {
        self.name == name || self.super_types.iter().any(|s| s.conforms_to(name))
    }
}

/// Builder for [`Classifier`].
#[derive(Debug)]
pub struct ClassifierBuilder {
    name: SmolStr,
    super_types: Vec<Arc<Classifier>>,
    features: Vec<FeatureDef>,
}

impl ClassifierBuilder {
    pub fn super_type(mut self, super_type: &Arc<Classifier>) -> Self {
        self.super_types.push(Arc::clone(super_type));
        self
    }

    pub fn feature(mut self, feature: FeatureDef) -> Self {
        self.features.push(feature);
        self
    }

    /// Flatten inherited features and freeze the classifier.
    ///
    /// A feature name inherited twice (diamond) is kept once; an own feature
    /// with an inherited name shadows nothing and is appended as declared.
    pub fn build(self) -> Arc<Classifier> {
        let mut features: Vec<FeatureDef> = Vec::new();
        for super_type in &self.super_types {
            for inherited in &super_type.features {
                if !features.iter().any(|f| f.name == inherited.name) {
                    features.push(inherited.clone());
                }
            }
        }
        features.extend(self.features);
        Arc::new(Classifier {
            name: self.name,
            super_types: self.super_types,
            features,
        })
    }
}

// ============================================================================
// PACKAGE
// ============================================================================

/// A named collection of classifiers identified by a namespace URI.
#[derive(Debug, PartialEq, Eq)]
pub struct Package {
    ns_uri: SmolStr,
    name: SmolStr,
    classifiers: IndexMap<SmolStr, Arc<Classifier>>,
}

impl Package {
    pub fn new(ns_uri: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self {
            ns_uri: ns_uri.into(),
            name: name.into(),
            classifiers: IndexMap::new(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<Classifier>) -> Self {
        self.classifiers
            .insert(SmolStr::new(classifier.name()), classifier);
        self
    }

    pub fn ns_uri(&self) -> &str {
        &self.ns_uri
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classifier(&self, name: &str) -> Option<&Arc<Classifier>> {
        self.classifiers.get(name)
    }

    /// Classifiers in declaration order.
    pub fn classifiers(&self) -> impl Iterator<Item = &Arc<Classifier>> {
        self.classifiers.values()
    }
}
