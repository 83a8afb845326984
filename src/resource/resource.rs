//! A single loaded source unit and its node tree.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use super::diagnostics::Diagnostic;
use crate::base::{Fragment, LineCol, LineIndex, ResourceUri, TextSize, Uri};
use crate::model::{NodeId, NodeRef, Proxy, Reference, SlotKey, Tree, UnresolvedReference};
use crate::naming::QualifiedName;
use crate::parser::{ParseOutput, Parser};
use crate::{Error, Result};

static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

/// A fresh modification stamp, unique across all resources of the process.
fn next_stamp() -> u64 {
    NEXT_STAMP.fetch_add(1, Ordering::Relaxed)
}

/// Lifecycle of a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    /// Loaded, but the parser reported errors. The tree may be partial.
    LoadedWithErrors,
}

impl LoadState {
    pub fn is_loaded(self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::LoadedWithErrors)
    }
}

/// Summary of one `load` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseResult {
    pub root: Option<NodeId>,
    /// Error-severity parse diagnostics.
    pub errors: Vec<Diagnostic>,
    /// References left for the linker.
    pub unresolved: usize,
}

impl ParseResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// How an edit changed the URIs of a resource's nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Relocation {
    /// Old URI to new URI of nodes still reachable from the root.
    moved: FxHashMap<Uri, Uri>,
    /// Old URIs of nodes no longer reachable from the root.
    detached: FxHashSet<Uri>,
}

impl Relocation {
    fn between(before: &FxHashMap<NodeId, Uri>, after: &FxHashMap<NodeId, Uri>) -> Self {
        let mut relocation = Self::default();
        for (id, old) in before {
            match after.get(id) {
                Some(new) if new != old => {
                    relocation.moved.insert(old.clone(), new.clone());
                }
                Some(_) => {}
                None => {
                    relocation.detached.insert(old.clone());
                }
            }
        }
        relocation
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.moved.is_empty() && self.detached.is_empty()
    }
}

/// An owned node tree loaded from one source unit.
///
/// The resource keeps the references its parser could not bind, the
/// diagnostics of the last load and link runs, and a modification stamp that
/// changes whenever anything a [`ResourceDescription`](crate::description::ResourceDescription)
/// depends on changes.
pub struct Resource {
    uri: ResourceUri,
    parser: Option<Arc<dyn Parser>>,
    tree: Option<Tree>,
    state: LoadState,
    parse_diagnostics: Vec<Diagnostic>,
    /// Keyed by slot so repeated link runs replace instead of append.
    link_diagnostics: IndexMap<SlotKey, Diagnostic>,
    unresolved: Vec<UnresolvedReference>,
    /// Name and target of every slot the linker bound from a written name.
    link_names: FxHashMap<SlotKey, (QualifiedName, Uri)>,
    imported_names: IndexSet<QualifiedName>,
    stamp: u64,
    line_index: Option<LineIndex>,
}

impl Resource {
    /// An unloaded resource without a parser.
    pub fn new(uri: impl Into<ResourceUri>) -> Self {
        Self {
            uri: uri.into(),
            parser: None,
            tree: None,
            state: LoadState::Unloaded,
            parse_diagnostics: Vec::new(),
            link_diagnostics: IndexMap::new(),
            unresolved: Vec::new(),
            link_names: FxHashMap::default(),
            imported_names: IndexSet::new(),
            stamp: next_stamp(),
            line_index: None,
        }
    }

    /// An unloaded resource that parses with `parser`.
    pub fn with_parser(uri: impl Into<ResourceUri>, parser: Arc<dyn Parser>) -> Self {
        let mut resource = Self::new(uri);
        resource.parser = Some(parser);
        resource
    }

    /// A loaded resource around a tree built in code.
    pub fn from_tree(uri: impl Into<ResourceUri>, tree: Tree) -> Self {
        let mut resource = Self::new(uri);
        resource.install(ParseOutput::new(tree));
        resource
    }

    /// Parse `text` into a fresh tree, replacing any previous content.
    ///
    /// Syntax problems do not fail the call: they end up in
    /// [`diagnostics`](Self::diagnostics) and the state becomes
    /// [`LoadState::LoadedWithErrors`].
    pub fn load(&mut self, text: &str) -> Result<ParseResult> {
        let parser = self
            .parser
            .clone()
            .ok_or_else(|| Error::NoLanguage(self.uri.clone()))?;
        debug!("loading resource '{}' ({} bytes)", self.uri, text.len());
        self.state = LoadState::Loading;
        let output = parser.parse(text);
        let result = self.install(output);
        self.line_index = Some(LineIndex::new(text));
        Ok(result)
    }

    /// Replace the content with an already parsed tree.
    pub fn install(&mut self, output: ParseOutput) -> ParseResult {
        let ParseOutput {
            tree,
            unresolved,
            diagnostics,
        } = output;

        let errors: Vec<Diagnostic> = diagnostics.iter().filter(|d| d.is_error()).cloned().collect();
        let root = tree.root();
        self.tree = Some(tree);
        self.unresolved = unresolved;
        self.sort_unresolved();
        self.parse_diagnostics = diagnostics;
        self.link_diagnostics.clear();
        self.link_names.clear();
        self.imported_names.clear();
        self.line_index = None;
        self.state = if errors.is_empty() {
            LoadState::Loaded
        } else {
            LoadState::LoadedWithErrors
        };
        self.touch();

        trace!(
            "resource '{}' loaded: {} errors, {} unresolved references",
            self.uri,
            errors.len(),
            self.unresolved.len()
        );
        ParseResult {
            root,
            errors,
            unresolved: self.unresolved.len(),
        }
    }

    /// Drop the tree. Every URI into this resource stops resolving.
    pub fn unload(&mut self) {
        if self.state == LoadState::Unloaded {
            return;
        }
        debug!("unloading resource '{}'", self.uri);
        self.tree = None;
        self.unresolved.clear();
        self.parse_diagnostics.clear();
        self.link_diagnostics.clear();
        self.link_names.clear();
        self.imported_names.clear();
        self.line_index = None;
        self.state = LoadState::Unloaded;
        self.touch();
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn uri(&self) -> &ResourceUri {
        &self.uri
    }

    pub fn parser(&self) -> Option<&Arc<dyn Parser>> {
        self.parser.as_ref()
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    pub fn modification_stamp(&self) -> u64 {
        self.stamp
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    /// Mutate the tree. Counts as a modification.
    ///
    /// Nodes the edit moves keep their identity: bound references into them
    /// follow them to their new URI. References into nodes the edit detaches
    /// become unresolved again. Inside a [`ResourceSet`](super::ResourceSet),
    /// use [`edit_resource`](super::ResourceSet::edit_resource) so that other
    /// resources follow as well.
    pub fn edit<R>(&mut self, edit: impl FnOnce(&mut Tree) -> Result<R>) -> Result<R> {
        let (result, _) = self.edit_relocating(edit)?;
        result
    }

    /// Run `edit` and relocate this resource's references. The relocation is
    /// returned even when `edit` fails halfway, for the other resources of
    /// the set.
    pub(crate) fn edit_relocating<R>(
        &mut self,
        edit: impl FnOnce(&mut Tree) -> Result<R>,
    ) -> Result<(Result<R>, Relocation)> {
        let before = self.node_uris();
        let tree = self
            .tree
            .as_mut()
            .ok_or_else(|| Error::ResourceNotFound(self.uri.clone()))?;
        let result = edit(tree);

        let after = self.node_uris();
        self.forget_stale_slots(&after);
        let relocation = Relocation::between(&before, &after);
        if !relocation.is_empty() {
            debug!(
                "edit of '{}' moved {} and detached {} nodes",
                self.uri,
                relocation.moved.len(),
                relocation.detached.len()
            );
        }
        self.relocate_references(&relocation);
        self.touch();
        Ok((result, relocation))
    }

    pub fn root(&self) -> Option<NodeRef<'_>> {
        let tree = self.tree.as_ref()?;
        NodeRef::new(tree, &self.uri, tree.root()?)
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        NodeRef::new(self.tree.as_ref()?, &self.uri, id)
    }

    /// All nodes reachable from the root, in pre-order.
    pub fn contents(&self) -> Vec<NodeRef<'_>> {
        let Some(tree) = self.tree.as_ref() else {
            return Vec::new();
        };
        tree.all_nodes()
            .into_iter()
            .filter_map(|id| NodeRef::new(tree, &self.uri, id))
            .collect()
    }

    /// Look up a node by URI within this resource only.
    pub fn resolve(&self, uri: &Uri) -> Option<NodeRef<'_>> {
        if !uri.is_in(&self.uri) {
            return None;
        }
        let id = self.resolve_fragment(uri.fragment())?;
        self.node(id)
    }

    pub fn resolve_fragment(&self, fragment: &Fragment) -> Option<NodeId> {
        self.tree.as_ref()?.resolve_fragment(fragment)
    }

    pub fn uri_of(&self, id: NodeId) -> Option<Uri> {
        let fragment = self.tree.as_ref()?.fragment(id)?;
        Some(self.uri.with_fragment(fragment))
    }

    /// Parse diagnostics followed by link diagnostics.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.parse_diagnostics
            .iter()
            .chain(self.link_diagnostics.values())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics().filter(|d| d.is_error())
    }

    /// References still waiting for the linker, in document order.
    pub fn unresolved(&self) -> &[UnresolvedReference] {
        &self.unresolved
    }

    /// Names the linker looked up on behalf of this resource.
    pub fn imported_names(&self) -> &IndexSet<QualifiedName> {
        &self.imported_names
    }

    /// Line and column of a byte offset in the text the resource was loaded
    /// from. `None` for resources built in code.
    pub fn line_col(&self, offset: TextSize) -> Option<LineCol> {
        self.line_index.as_ref().map(|index| index.line_col(offset))
    }

    // ========================================================================
    // LINKER HOOKS
    // ========================================================================

    /// Bind a pending reference. The slot leaves the pending list and loses
    /// any unresolved diagnostic; `warning` replaces it when given.
    pub(crate) fn bind(
        &mut self,
        pending: &UnresolvedReference,
        target: Uri,
        warning: Option<Diagnostic>,
    ) -> Result<()> {
        let slot = pending.slot();
        let tree = self
            .tree
            .as_mut()
            .ok_or_else(|| Error::ResourceNotFound(self.uri.clone()))?;
        tree.replace_reference(slot, Reference::Bound(target.clone()))?;
        match &pending.proxy {
            Proxy::Name(name) => {
                self.link_names.insert(slot, (name.clone(), target));
            }
            Proxy::Uri(_) => {
                self.link_names.remove(&slot);
            }
        }
        self.unresolved.retain(|u| u.slot() != slot);
        match warning {
            Some(warning) => {
                self.link_diagnostics.insert(slot, warning);
            }
            None => {
                self.link_diagnostics.shift_remove(&slot);
            }
        }
        self.touch();
        Ok(())
    }

    /// Record the diagnostic for a reference that stays unresolved.
    pub(crate) fn report_unresolved(&mut self, pending: &UnresolvedReference, diagnostic: Diagnostic) {
        self.link_diagnostics.insert(pending.slot(), diagnostic);
    }

    pub(crate) fn record_imported_name(&mut self, name: &QualifiedName) {
        if self.imported_names.insert(name.clone()) {
            self.touch();
        }
    }

    /// Turn every bound reference into `target` back into a proxy and queue
    /// it for the linker again. Returns the number of demoted values.
    pub(crate) fn demote_references_into(&mut self, target: &ResourceUri) -> usize {
        let Some(tree) = self.tree.as_ref() else {
            return 0;
        };
        let slots = reference_values(tree)
            .into_iter()
            .filter_map(|(slot, value)| match value {
                Reference::Bound(uri) if uri.is_in(target) => Some((slot, uri)),
                _ => None,
            })
            .collect();
        self.demote(slots)
    }

    /// Apply an edit of some resource: bound references and URI proxies into
    /// moved nodes are rewritten, bound references into detached nodes are
    /// demoted. Returns the number of changed values.
    pub(crate) fn relocate_references(&mut self, relocation: &Relocation) -> usize {
        if relocation.is_empty() {
            return 0;
        }
        let Some(tree) = self.tree.as_mut() else {
            return 0;
        };
        let mut demoted = Vec::new();
        let mut rewritten = 0;
        for (slot, value) in reference_values(tree) {
            let relocated = match value {
                Reference::Bound(uri) if relocation.detached.contains(&uri) => {
                    demoted.push((slot, uri));
                    continue;
                }
                Reference::Bound(uri) => match relocation.moved.get(&uri) {
                    Some(new) => {
                        if let Some((_, bound)) = self.link_names.get_mut(&slot) {
                            *bound = new.clone();
                        }
                        Reference::Bound(new.clone())
                    }
                    None => continue,
                },
                Reference::Unresolved(Proxy::Uri(uri)) => match relocation.moved.get(&uri) {
                    Some(new) => Reference::Unresolved(Proxy::Uri(new.clone())),
                    None => continue,
                },
                Reference::Unresolved(Proxy::Name(_)) => continue,
            };
            if let Reference::Unresolved(proxy) = &relocated {
                for pending in self.unresolved.iter_mut().filter(|u| u.slot() == slot) {
                    pending.proxy = proxy.clone();
                }
            }
            let replaced = tree.replace_reference(slot, relocated);
            debug_assert!(replaced.is_ok(), "relocating a slot read from the tree: {replaced:?}");
            rewritten += 1;
        }
        if rewritten > 0 {
            self.touch();
        }
        rewritten + self.demote(demoted)
    }

    /// Replace bound values with proxies and queue them. A slot the linker
    /// bound from a name gets that name back; any other slot keeps the
    /// address it was bound to.
    fn demote(&mut self, slots: Vec<(SlotKey, Uri)>) -> usize {
        let Some(tree) = self.tree.as_mut() else {
            return 0;
        };
        if slots.is_empty() {
            return 0;
        }
        let count = slots.len();
        for (slot, uri) in slots {
            let proxy = match self.link_names.remove(&slot) {
                Some((name, bound)) if bound == uri => Proxy::Name(name),
                _ => Proxy::Uri(uri),
            };
            let replaced = tree.replace_reference(slot, Reference::Unresolved(proxy.clone()));
            debug_assert!(replaced.is_ok(), "demoting a slot read from the tree: {replaced:?}");
            self.link_diagnostics.shift_remove(&slot);
            self.unresolved.push(UnresolvedReference {
                source: slot.source,
                feature: slot.feature,
                index: slot.index,
                proxy,
            });
        }
        self.sort_unresolved();
        self.touch();
        count
    }

    /// URIs of all nodes reachable from the root.
    fn node_uris(&self) -> FxHashMap<NodeId, Uri> {
        self.contents()
            .into_iter()
            .filter_map(|node| Some((node.id(), node.uri()?)))
            .collect()
    }

    /// Drop bookkeeping for slots an edit detached or overwrote.
    fn forget_stale_slots(&mut self, reachable: &FxHashMap<NodeId, Uri>) {
        let Some(tree) = self.tree.as_ref() else {
            return;
        };
        self.unresolved
            .retain(|u| reachable.contains_key(&u.source));
        self.link_diagnostics
            .retain(|slot, _| reachable.contains_key(&slot.source));
        self.link_names.retain(|slot, (_, bound)| {
            matches!(tree.reference_at(*slot), Some(Reference::Bound(uri)) if *uri == *bound)
        });
    }

    /// Order pending references by source position, then feature, then index.
    fn sort_unresolved(&mut self) {
        let Some(tree) = self.tree.as_ref() else {
            return;
        };
        let order: FxHashMap<NodeId, usize> = tree
            .all_nodes()
            .into_iter()
            .enumerate()
            .map(|(position, id)| (id, position))
            .collect();
        self.unresolved.sort_by_key(|u| {
            (
                order.get(&u.source).copied().unwrap_or(usize::MAX),
                u.feature,
                u.index,
            )
        });
    }

    fn touch(&mut self) {
        self.stamp = next_stamp();
    }
}

/// Every reference value of the reachable nodes, with its slot key.
fn reference_values(tree: &Tree) -> Vec<(SlotKey, Reference)> {
    let mut values = Vec::new();
    for id in tree.all_nodes() {
        for (feature, def, references) in tree.reference_slots(id) {
            for (index, value) in references.iter().enumerate() {
                let slot = SlotKey {
                    source: id,
                    feature,
                    index: def.is_many().then_some(index),
                };
                values.push((slot, value.clone()));
            }
        }
    }
    values
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("uri", &self.uri)
            .field("state", &self.state)
            .field("nodes", &self.tree.as_ref().map(Tree::len))
            .field("unresolved", &self.unresolved.len())
            .field("stamp", &self.stamp)
            .finish()
    }
}
