//! Lazy cross-reference resolution across a resource set.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::scope::ScopeProvider;
use crate::base::{TextRange, Uri};
use crate::model::{Proxy, UnresolvedReference};
use crate::resource::{Diagnostic, DiagnosticKind, Resource, ResourceSet, codes};

/// Result of one linker run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkingOutcome {
    /// References bound during this run.
    pub bound: usize,
    /// References still pending across the whole set after the run.
    pub unresolved: usize,
    /// The run stopped early because the token was cancelled.
    pub cancelled: bool,
}

/// What the linker needs to know about a pending reference before mutating
/// its resource.
struct SlotContext {
    expected: Option<SmolStr>,
    source: Option<Uri>,
    range: Option<TextRange>,
}

/// What resolving one reference did.
#[derive(Default)]
struct Resolution {
    bound: bool,
    /// Index of a resource this step demand-loaded.
    loaded: Option<usize>,
}

/// Bind every pending reference of every resource in `set`.
///
/// Resources are visited in set order; a resource demand-loaded by this run
/// is queued again, even if the run already passed it. Within a resource,
/// references are visited in document order.
/// A reference binds to the first candidate whose classifier conforms to
/// the feature's target type. A reference without such a candidate keeps its
/// proxy and gets an unresolved-reference diagnostic keyed by its slot, so
/// running again yields the same diagnostics instead of duplicates.
///
/// Cancellation is checked before each reference; everything not yet
/// visited stays pending.
pub fn resolve_lazy_cross_references(
    set: &mut ResourceSet,
    scope: &dyn ScopeProvider,
    cancel: &CancellationToken,
) -> LinkingOutcome {
    let mut outcome = LinkingOutcome::default();
    debug!("linking {} resources", set.len());

    let mut queue: VecDeque<usize> = (0..set.len()).collect();
    let mut queued: FxHashSet<usize> = queue.iter().copied().collect();
    'resources: while let Some(index) = queue.pop_front() {
        queued.remove(&index);
        let pending: Vec<UnresolvedReference> = match set.resource_at(index) {
            Some(resource) if resource.is_loaded() => resource.unresolved().to_vec(),
            _ => continue,
        };
        for reference in &pending {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break 'resources;
            }
            let resolution = resolve_one(set, index, reference, scope);
            if resolution.bound {
                outcome.bound += 1;
            }
            if let Some(loaded) = resolution.loaded {
                if queued.insert(loaded) {
                    queue.push_back(loaded);
                }
            }
        }
    }
    outcome.unresolved = set.resources().map(|r| r.unresolved().len()).sum();
    debug!(
        "linking finished: {} bound, {} unresolved{}",
        outcome.bound,
        outcome.unresolved,
        if outcome.cancelled { " (cancelled)" } else { "" }
    );
    outcome
}

/// Try to bind one reference of the resource at `index`.
fn resolve_one(
    set: &mut ResourceSet,
    index: usize,
    reference: &UnresolvedReference,
    scope: &dyn ScopeProvider,
) -> Resolution {
    let mut resolution = Resolution::default();
    let Some(context) = slot_context(set, index, reference) else {
        return resolution;
    };

    let candidates: Vec<Uri> = match &reference.proxy {
        Proxy::Uri(target) => {
            let was_loaded = set
                .resource(target.resource())
                .is_some_and(Resource::is_loaded);
            match set.ensure_loaded(target.resource()) {
                Ok(()) if !was_loaded => resolution.loaded = set.index_of(target.resource()),
                Ok(()) => {}
                Err(e) => trace!("cannot load target of '{}': {}", target, e),
            }
            vec![target.clone()]
        }
        Proxy::Name(name) => {
            if let Some(resource) = set.resource_at_mut(index) {
                resource.record_imported_name(name);
            }
            lookup(set, index, reference, name, scope)
        }
    };

    let conforming: Vec<Uri> = candidates
        .into_iter()
        .filter(|uri| {
            set.node(uri).is_some_and(|node| {
                context
                    .expected
                    .as_deref()
                    .is_none_or(|expected| node.is_a(expected))
            })
        })
        .collect();

    let type_name = context.expected.as_deref().unwrap_or("object");
    let Some(resource) = set.resource_at_mut(index) else {
        return resolution;
    };

    match conforming.first() {
        Some(target) => {
            let warning = (conforming.len() > 1).then(|| {
                Diagnostic::warning(
                    DiagnosticKind::Linking,
                    format!(
                        "ambiguous reference to {} '{}': {} candidates, bound to '{}'",
                        type_name,
                        reference.proxy,
                        conforming.len(),
                        target
                    ),
                )
                .with_code(codes::AMBIGUOUS_REFERENCE)
                .with_source(context.source.clone())
                .with_range(context.range)
            });
            match resource.bind(reference, target.clone(), warning) {
                Ok(()) => {
                    trace!("bound '{}' to '{}'", reference.proxy, target);
                    resolution.bound = true;
                }
                Err(e) => {
                    warn!("cannot bind '{}' in '{}': {}", reference.proxy, resource.uri(), e);
                }
            }
        }
        None => {
            trace!("unresolved '{}' in '{}'", reference.proxy, resource.uri());
            resource.report_unresolved(
                reference,
                Diagnostic::error(
                    DiagnosticKind::Linking,
                    format!("couldn't resolve reference to {} '{}'", type_name, reference.proxy),
                )
                .with_code(codes::UNRESOLVED_REFERENCE)
                .with_source(context.source)
                .with_range(context.range),
            );
        }
    }
    resolution
}

fn slot_context(
    set: &ResourceSet,
    index: usize,
    reference: &UnresolvedReference,
) -> Option<SlotContext> {
    let source = set.resource_at(index)?.node(reference.source)?;
    let feature = source.classifier().feature(reference.feature)?;
    Some(SlotContext {
        expected: feature.target_type().map(SmolStr::new),
        source: source.uri(),
        range: source.range(),
    })
}

fn lookup(
    set: &ResourceSet,
    index: usize,
    reference: &UnresolvedReference,
    name: &crate::naming::QualifiedName,
    scope: &dyn ScopeProvider,
) -> Vec<Uri> {
    let Some(source) = set
        .resource_at(index)
        .and_then(|r| r.node(reference.source))
    else {
        return Vec::new();
    };
    let Some(feature) = source.classifier().feature(reference.feature) else {
        return Vec::new();
    };
    scope.lookup(set, source, feature, name)
}
