//! Cancellation of linker runs.

use std::sync::atomic::{AtomicUsize, Ordering};

use loom::Uri;
use loom::linking::{GlobalScopeProvider, ScopeProvider, resolve_lazy_cross_references};
use loom::model::{FeatureDef, NodeRef};
use loom::naming::{QualifiedName, SimpleNameProvider};
use loom::resource::ResourceSet;
use tokio_util::sync::CancellationToken;

use crate::helpers::set_helpers::*;

/// Global scope that cancels the run's token after a fixed number of
/// lookups.
struct CancellingScope {
    inner: GlobalScopeProvider,
    token: CancellationToken,
    budget: usize,
    lookups: AtomicUsize,
}

impl CancellingScope {
    fn new(token: CancellationToken, budget: usize) -> Self {
        Self {
            inner: GlobalScopeProvider::new(SimpleNameProvider),
            token,
            budget,
            lookups: AtomicUsize::new(0),
        }
    }
}

impl ScopeProvider for CancellingScope {
    fn lookup(
        &self,
        set: &ResourceSet,
        from: NodeRef<'_>,
        feature: &FeatureDef,
        name: &QualifiedName,
    ) -> Vec<Uri> {
        let found = self.inner.lookup(set, from, feature, name);
        if self.lookups.fetch_add(1, Ordering::SeqCst) + 1 >= self.budget {
            self.token.cancel();
        }
        found
    }
}

fn sources() -> ResourceSet {
    set_from_sources(&[
        ("foo.types", "type A extends B implements C, D;"),
        ("bar.types", "type B; type C; type D;"),
    ])
}

#[test]
fn test_cancelled_before_start_binds_nothing() {
    let mut set = sources();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = resolve_lazy_cross_references(
        &mut set,
        &GlobalScopeProvider::new(SimpleNameProvider),
        &cancel,
    );

    assert!(outcome.cancelled);
    assert_eq!(outcome.bound, 0);
    assert_eq!(outcome.unresolved, 3);
    assert!(diagnostics_of(&set, "foo.types").is_empty());
}

#[test]
fn test_cancellation_stops_before_the_next_reference() {
    let mut set = sources();
    let cancel = CancellationToken::new();
    let scope = CancellingScope::new(cancel.clone(), 1);

    let outcome = resolve_lazy_cross_references(&mut set, &scope, &cancel);

    assert!(outcome.cancelled);
    assert_eq!(outcome.bound, 1);
    assert_eq!(outcome.unresolved, 2);
    assert_eq!(scope.lookups.load(Ordering::SeqCst), 1);

    let a = set.node(&uri("foo.types#//@elements.0")).unwrap();
    assert!(a.references("extends")[0].is_bound());
    assert!(a.references("implements").iter().all(|r| !r.is_bound()));
    // Unvisited references are pending, not failed.
    assert!(diagnostics_of(&set, "foo.types").is_empty());
}

#[test]
fn test_rerun_after_cancellation_finishes_the_work() {
    let mut set = sources();
    let cancel = CancellationToken::new();
    let scope = CancellingScope::new(cancel.clone(), 2);
    let partial = resolve_lazy_cross_references(&mut set, &scope, &cancel);
    assert_eq!(partial.bound, 2);

    let rest = link(&mut set);

    assert!(!rest.cancelled);
    assert_eq!(rest.bound, 1);
    assert_eq!(rest.unresolved, 0);
    let a = set.node(&uri("foo.types#//@elements.0")).unwrap();
    let implements: Vec<_> = a
        .references("implements")
        .iter()
        .map(|r| r.target().cloned())
        .collect();
    assert_eq!(
        implements,
        [
            Some(uri("bar.types#//@elements.1")),
            Some(uri("bar.types#//@elements.2")),
        ]
    );
}
