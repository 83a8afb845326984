//! Arena-backed node tree.
//!
//! A [`Tree`] owns every node of one resource. Containment is stored as
//! parent → child ids inside the parent's feature slot plus a back link on the
//! child, so the containment graph is a tree by construction: `attach` rejects
//! cycles, second owners and cardinality overflows before touching anything.
//!
//! Detached nodes stay in the arena but are unreachable from the root, so they
//! have no fragment (and therefore no URI).

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use super::metamodel::{Classifier, FeatureDef, FeatureId, FeatureKind};
use super::value::{Proxy, Reference, SlotKey, UnresolvedReference, Value};
use crate::base::{Fragment, TextRange};
use crate::error::StructureViolation;

/// Index of a node in its [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Values of one feature, in declaration order of the classifier's features.
#[derive(Clone, Debug)]
enum Slot {
    Attribute(Vec<Value>),
    Containment(Vec<NodeId>),
    Reference(Vec<Reference>),
}

impl Slot {
    fn for_feature(feature: &FeatureDef) -> Self {
        match feature.kind() {
            FeatureKind::Attribute => Slot::Attribute(Vec::new()),
            FeatureKind::Containment => Slot::Containment(Vec::new()),
            FeatureKind::Reference => Slot::Reference(Vec::new()),
        }
    }

    fn children(&self) -> &[NodeId] {
        match self {
            Slot::Containment(children) => children,
            _ => &[],
        }
    }
}

#[derive(Clone, Debug)]
struct NodeData {
    classifier: Arc<Classifier>,
    container: Option<(NodeId, FeatureId)>,
    slots: Vec<Slot>,
    range: Option<TextRange>,
}

type StructureResult<T> = std::result::Result<T, StructureViolation>;

/// The node graph of one resource.
#[derive(Clone, Debug, Default)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new, uncontained node.
    pub fn create_node(&mut self, classifier: &Arc<Classifier>) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        let slots = classifier
            .features()
            .map(|(_, f)| Slot::for_feature(f))
            .collect();
        self.nodes.push(NodeData {
            classifier: Arc::clone(classifier),
            container: None,
            slots,
            range: None,
        });
        id
    }

    /// Make an uncontained node the root of the tree.
    pub fn set_root(&mut self, id: NodeId) -> crate::Result<()> {
        if self.data(id)?.container.is_some() {
            return Err(StructureViolation::AlreadyContained(id).into());
        }
        self.root = Some(id);
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn classifier(&self, id: NodeId) -> Option<&Arc<Classifier>> {
        self.nodes.get(id.index()).map(|d| &d.classifier)
    }

    /// The container node and the containment feature holding `id`.
    pub fn container(&self, id: NodeId) -> Option<(NodeId, FeatureId)> {
        self.nodes.get(id.index()).and_then(|d| d.container)
    }

    pub fn range(&self, id: NodeId) -> Option<TextRange> {
        self.nodes.get(id.index()).and_then(|d| d.range)
    }

    /// Record the source text covered by a node.
    pub fn set_range(&mut self, id: NodeId, range: TextRange) {
        if let Some(data) = self.nodes.get_mut(id.index()) {
            data.range = Some(range);
        }
    }

    pub fn feature_id(&self, id: NodeId, feature: &str) -> crate::Result<FeatureId> {
        let data = self.data(id)?;
        data.classifier
            .feature_by_name(feature)
            .map(|(fid, _)| fid)
            .ok_or_else(|| unknown_feature(&data.classifier, feature).into())
    }

    // ========================================================================
    // ATTRIBUTES
    // ========================================================================

    /// Set a single-valued attribute, replacing any previous value.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        feature: &str,
        value: impl Into<Value>,
    ) -> crate::Result<()> {
        let (fid, many) = self.resolve_feature(id, feature, FeatureKind::Attribute)?;
        if many {
            return Err(StructureViolation::NotSingleValued(feature.into()).into());
        }
        if let Slot::Attribute(values) = self.slot_mut(id, fid)? {
            *values = vec![value.into()];
        }
        Ok(())
    }

    /// Append to a multi-valued attribute, or fill an empty single-valued one.
    pub fn add_attribute(
        &mut self,
        id: NodeId,
        feature: &str,
        value: impl Into<Value>,
    ) -> crate::Result<()> {
        let (fid, many) = self.resolve_feature(id, feature, FeatureKind::Attribute)?;
        if let Slot::Attribute(values) = self.slot_mut(id, fid)? {
            if !many && !values.is_empty() {
                return Err(StructureViolation::CardinalityExceeded(feature.into()).into());
            }
            values.push(value.into());
        }
        Ok(())
    }

    /// First value of an attribute.
    pub fn attribute(&self, id: NodeId, feature: &str) -> Option<&Value> {
        self.attributes(id, feature).first()
    }

    pub fn attributes(&self, id: NodeId, feature: &str) -> &[Value] {
        match self.slot_by_name(id, feature) {
            Some(Slot::Attribute(values)) => values,
            _ => &[],
        }
    }

    // ========================================================================
    // CONTAINMENT
    // ========================================================================

    /// Attach `child` under `container` through a containment feature.
    ///
    /// `index` positions the child in a multi-valued feature; `None` appends.
    pub fn attach(
        &mut self,
        container: NodeId,
        feature: &str,
        index: Option<usize>,
        child: NodeId,
    ) -> crate::Result<()> {
        let (fid, many) = self.resolve_feature(container, feature, FeatureKind::Containment)?;
        let child_data = self.data(child)?;

        if Some(child) == self.root {
            return Err(StructureViolation::AttachRoot.into());
        }
        if child == container || self.is_ancestor(child, container) {
            return Err(StructureViolation::Cycle { child, container }.into());
        }
        if child_data.container.is_some() {
            return Err(StructureViolation::AlreadyContained(child).into());
        }
        let expected = self.data(container)?.classifier.feature(fid).and_then(|f| f.target_type());
        if let Some(expected) = expected {
            if !child_data.classifier.conforms_to(expected) {
                return Err(StructureViolation::TypeMismatch {
                    feature: feature.into(),
                    expected: expected.into(),
                    found: child_data.classifier.name().into(),
                }
                .into());
            }
        }

        if let Slot::Containment(children) = self.slot_mut(container, fid)? {
            let len = children.len();
            if !many && len > 0 {
                return Err(StructureViolation::CardinalityExceeded(feature.into()).into());
            }
            let index = index.unwrap_or(len);
            if index > len {
                return Err(StructureViolation::IndexOutOfBounds {
                    feature: feature.into(),
                    index,
                    len,
                }
                .into());
            }
            children.insert(index, child);
        }
        self.data_mut(child)?.container = Some((container, fid));
        Ok(())
    }

    /// Remove `child` from its container. The node stays in the arena but
    /// loses its fragment.
    pub fn detach(&mut self, child: NodeId) -> crate::Result<()> {
        let (container, fid) = self
            .data(child)?
            .container
            .ok_or(StructureViolation::NotContained(child))?;
        if let Slot::Containment(children) = self.slot_mut(container, fid)? {
            children.retain(|&c| c != child);
        }
        self.data_mut(child)?.container = None;
        Ok(())
    }

    /// Children held by one containment feature.
    pub fn children(&self, id: NodeId, feature: &str) -> &[NodeId] {
        self.slot_by_name(id, feature)
            .map(Slot::children)
            .unwrap_or(&[])
    }

    /// All direct children, in feature declaration order then list order.
    pub fn contents(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .get(id.index())
            .into_iter()
            .flat_map(|d| d.slots.iter())
            .flat_map(Slot::children)
            .copied()
    }

    /// True if `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.container(node);
        while let Some((parent, _)) = current {
            if parent == ancestor {
                return true;
            }
            current = self.container(parent);
        }
        false
    }

    /// `from` and everything it transitively contains, in pre-order.
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        if !self.contains(from) {
            return result;
        }
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            result.push(id);
            let children: Vec<NodeId> = self.contents(id).collect();
            stack.extend(children.into_iter().rev());
        }
        result
    }

    /// Every node reachable from the root, in pre-order.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        self.root.map(|r| self.descendants(r)).unwrap_or_default()
    }

    // ========================================================================
    // REFERENCES
    // ========================================================================

    /// Set a single-valued reference, replacing any previous value.
    pub fn set_reference(
        &mut self,
        id: NodeId,
        feature: &str,
        reference: Reference,
    ) -> crate::Result<()> {
        let (fid, many) = self.resolve_feature(id, feature, FeatureKind::Reference)?;
        if many {
            return Err(StructureViolation::NotSingleValued(feature.into()).into());
        }
        if let Slot::Reference(values) = self.slot_mut(id, fid)? {
            *values = vec![reference];
        }
        Ok(())
    }

    /// Append to a multi-valued reference, or fill an empty single-valued one.
    ///
    /// Returns the position of the new value.
    pub fn add_reference(
        &mut self,
        id: NodeId,
        feature: &str,
        reference: Reference,
    ) -> crate::Result<usize> {
        let (fid, many) = self.resolve_feature(id, feature, FeatureKind::Reference)?;
        match self.slot_mut(id, fid)? {
            Slot::Reference(values) => {
                if !many && !values.is_empty() {
                    return Err(StructureViolation::CardinalityExceeded(feature.into()).into());
                }
                values.push(reference);
                Ok(values.len() - 1)
            }
            _ => Ok(0),
        }
    }

    /// Store an unresolved proxy and return the pending reference the linker
    /// will consume.
    pub fn add_proxy(
        &mut self,
        id: NodeId,
        feature: &str,
        proxy: Proxy,
    ) -> crate::Result<UnresolvedReference> {
        let (fid, many) = self.resolve_feature(id, feature, FeatureKind::Reference)?;
        let position = self.add_reference(id, feature, Reference::Unresolved(proxy.clone()))?;
        Ok(UnresolvedReference {
            source: id,
            feature: fid,
            index: many.then_some(position),
            proxy,
        })
    }

    /// Values of one reference feature.
    pub fn references(&self, id: NodeId, feature: &str) -> &[Reference] {
        match self.slot_by_name(id, feature) {
            Some(Slot::Reference(values)) => values,
            _ => &[],
        }
    }

    /// First value of a reference feature.
    pub fn reference(&self, id: NodeId, feature: &str) -> Option<&Reference> {
        self.references(id, feature).first()
    }

    /// Every reference feature of a node with its values, in declaration order.
    pub fn reference_slots(
        &self,
        id: NodeId,
    ) -> impl Iterator<Item = (FeatureId, &FeatureDef, &[Reference])> + '_ {
        self.nodes.get(id.index()).into_iter().flat_map(|data| {
            data.slots.iter().enumerate().filter_map(move |(i, slot)| match slot {
                Slot::Reference(values) => {
                    let fid = FeatureId::new(i as u32);
                    data.classifier
                        .feature(fid)
                        .map(|def| (fid, def, values.as_slice()))
                }
                _ => None,
            })
        })
    }

    /// The value stored at a slot key.
    pub fn reference_at(&self, slot: SlotKey) -> Option<&Reference> {
        match self.nodes.get(slot.source.index())?.slots.get(slot.feature.index())? {
            Slot::Reference(values) => values.get(slot.index.unwrap_or(0)),
            _ => None,
        }
    }

    /// Overwrite the value stored at a slot key.
    pub(crate) fn replace_reference(
        &mut self,
        slot: SlotKey,
        reference: Reference,
    ) -> crate::Result<()> {
        let feature = self.feature_name(slot.source, slot.feature);
        let kind = self
            .classifier(slot.source)
            .and_then(|c| c.feature(slot.feature))
            .map(FeatureDef::kind);
        match self.slot_mut(slot.source, slot.feature)? {
            Slot::Reference(values) => {
                let index = slot.index.unwrap_or(0);
                let len = values.len();
                let value = values
                    .get_mut(index)
                    .ok_or(StructureViolation::IndexOutOfBounds { feature, index, len })?;
                *value = reference;
                Ok(())
            }
            _ => Err(StructureViolation::WrongFeatureKind {
                feature,
                expected: FeatureKind::Reference,
                found: kind.unwrap_or(FeatureKind::Attribute),
            }
            .into()),
        }
    }

    // ========================================================================
    // FRAGMENTS
    // ========================================================================

    /// The containment path of a node, or `None` if it is not reachable from
    /// the root.
    pub fn fragment(&self, id: NodeId) -> Option<Fragment> {
        let mut steps: Vec<(&str, Option<usize>)> = Vec::new();
        let mut current = id;
        while let Some((parent, fid)) = self.container(current) {
            let parent_data = self.nodes.get(parent.index())?;
            let def = parent_data.classifier.feature(fid)?;
            let index = if def.is_many() {
                let siblings = parent_data.slots.get(fid.index())?.children();
                Some(siblings.iter().position(|&c| c == current)?)
            } else {
                None
            };
            steps.push((def.name(), index));
            current = parent;
        }
        if self.root != Some(current) {
            return None;
        }
        Some(
            steps
                .into_iter()
                .rev()
                .fold(Fragment::root(), |fragment, (feature, index)| {
                    fragment.child(feature, index)
                }),
        )
    }

    /// Walk a fragment down from the root.
    pub fn resolve_fragment(&self, fragment: &Fragment) -> Option<NodeId> {
        let steps = fragment.steps().ok()?;
        let mut current = self.root?;
        for step in steps {
            let data = self.nodes.get(current.index())?;
            let (fid, def) = data.classifier.feature_by_name(step.feature)?;
            if !def.is_containment() {
                return None;
            }
            let children = data.slots.get(fid.index())?.children();
            current = match (def.is_many(), step.index) {
                (true, Some(index)) => *children.get(index)?,
                (false, None) => *children.first()?,
                _ => return None,
            };
        }
        Some(current)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn data(&self, id: NodeId) -> StructureResult<&NodeData> {
        self.nodes
            .get(id.index())
            .ok_or(StructureViolation::UnknownNode(id))
    }

    fn data_mut(&mut self, id: NodeId) -> StructureResult<&mut NodeData> {
        self.nodes
            .get_mut(id.index())
            .ok_or(StructureViolation::UnknownNode(id))
    }

    fn slot_mut(&mut self, id: NodeId, fid: FeatureId) -> StructureResult<&mut Slot> {
        let data = self.data_mut(id)?;
        let classifier = data.classifier.name().into();
        data.slots
            .get_mut(fid.index())
            .ok_or(StructureViolation::UnknownFeature {
                classifier,
                feature: SmolStr::new(format!("#{}", fid.index())),
            })
    }

    fn slot_by_name(&self, id: NodeId, feature: &str) -> Option<&Slot> {
        let data = self.nodes.get(id.index())?;
        let (fid, _) = data.classifier.feature_by_name(feature)?;
        data.slots.get(fid.index())
    }

    fn feature_name(&self, id: NodeId, fid: FeatureId) -> SmolStr {
        self.classifier(id)
            .and_then(|c| c.feature(fid))
            .map(|f| SmolStr::new(f.name()))
            .unwrap_or_default()
    }

    /// Look up a feature by name and check its kind. Returns its id and
    /// whether it is multi-valued.
    fn resolve_feature(
        &self,
        id: NodeId,
        feature: &str,
        expected: FeatureKind,
    ) -> StructureResult<(FeatureId, bool)> {
        let data = self.data(id)?;
        let (fid, def) = data
            .classifier
            .feature_by_name(feature)
            .ok_or_else(|| unknown_feature(&data.classifier, feature))?;
        if def.kind() != expected {
            return Err(StructureViolation::WrongFeatureKind {
                feature: feature.into(),
                expected,
                found: def.kind(),
            });
        }
        Ok((fid, def.is_many()))
    }
}

fn unknown_feature(classifier: &Classifier, feature: &str) -> StructureViolation {
    StructureViolation::UnknownFeature {
        classifier: classifier.name().into(),
        feature: feature.into(),
    }
}
