//! Resource set membership, loading and demand-loading.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use loom::resource::{LoadState, ResourceSet, Severity, codes};
use loom::{Error, ResourceUri};

use crate::helpers::graph_fixtures::*;
use crate::helpers::set_helpers::*;

// =============================================================================
// MEMBERSHIP
// =============================================================================

#[test]
fn test_duplicate_resource_is_rejected() {
    let mut set = set_from_sources(&[("a.types", "type A;")]);

    let err = set.create_resource("a.types").unwrap_err();
    assert!(matches!(err, Error::DuplicateResource(dup) if dup.as_str() == "a.types"));

    let (resource, _) = flat_resource("a.types", &["x"]);
    assert!(matches!(
        set.add_resource(resource),
        Err(Error::DuplicateResource(_))
    ));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_unknown_extension_has_no_language() {
    let mut set = types_set();
    assert!(matches!(
        set.create_resource("notes.txt"),
        Err(Error::NoLanguage(_))
    ));
    assert!(matches!(
        set.load_resource("notes.txt", "type A;"),
        Err(Error::NoLanguage(_))
    ));
    assert!(set.is_empty());
}

#[test]
fn test_resources_keep_insertion_order() {
    let set = set_from_sources(&[
        ("c.types", "type C;"),
        ("a.types", "type A;"),
        ("b.types", "type B;"),
    ]);
    let uris: Vec<&str> = set.uris().map(ResourceUri::as_str).collect();
    assert_eq!(uris, ["c.types", "a.types", "b.types"]);
}

#[test]
fn test_syntax_errors_still_load() {
    let mut set = types_set();
    let result = set.load_resource("bad.types", "type A; type; type B;").unwrap();

    assert!(!result.is_success());
    let resource = set.resource(&"bad.types".into()).unwrap();
    assert_eq!(resource.load_state(), LoadState::LoadedWithErrors);
    assert!(resource.is_loaded());

    let names: Vec<_> = resource.contents().iter().filter_map(|n| n.name()).collect();
    assert!(names.contains(&"A"));
    assert!(names.contains(&"B"));

    let syntax: Vec<_> = resource
        .diagnostics()
        .filter(|d| d.code.as_deref() == Some(codes::SYNTAX_ERROR))
        .collect();
    assert!(!syntax.is_empty());
    assert!(syntax.iter().all(|d| d.severity == Severity::Error));
}

#[test]
fn test_reload_replaces_content() {
    let mut set = set_from_sources(&[("a.types", "type A;")]);
    let before = set.resource(&"a.types".into()).unwrap().modification_stamp();

    set.load_resource("a.types", "type B; type C;").unwrap();

    let resource = set.resource(&"a.types".into()).unwrap();
    assert_ne!(resource.modification_stamp(), before);
    let names: Vec<_> = resource.contents().iter().filter_map(|n| n.name()).collect();
    assert_eq!(names, ["B", "C"]);
}

// =============================================================================
// DEMAND LOADING
// =============================================================================

fn counting_set(calls: Arc<AtomicUsize>) -> ResourceSet {
    types_set().with_loader(move |uri: &ResourceUri| -> loom::Result<String> {
        calls.fetch_add(1, Ordering::SeqCst);
        match uri.as_str() {
            "lib.types" => Ok("type Base; type Other;".to_string()),
            _ => Err(Error::ResourceNotFound(uri.clone())),
        }
    })
}

#[test]
fn test_get_node_demand_loads_the_target_resource() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut set = counting_set(Arc::clone(&calls));
    assert!(set.has_loader());

    let target = uri("lib.types#//@elements.1");
    assert!(set.node(&target).is_none(), "node() never loads");

    let node = set.get_node(&target).expect("loader supplies lib.types");
    assert_eq!(node.name(), Some("Other"));
    assert_eq!(set.len(), 1);

    // Already loaded: no second call.
    set.get_node(&uri("lib.types#//@elements.0")).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_get_node_reports_missing_resources_as_none() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut set = counting_set(calls);

    assert!(set.get_node(&uri("missing.types#/")).is_none());
    assert!(!set.contains(&"missing.types".into()));
}

#[test]
fn test_get_node_without_loader_never_loads() {
    let mut set = types_set();
    assert!(!set.has_loader());
    assert!(set.get_node(&uri("lib.types#/")).is_none());
    assert!(matches!(
        set.ensure_loaded(&"lib.types".into()),
        Err(Error::ResourceNotFound(_))
    ));
}

#[test]
fn test_unloaded_resource_is_reloaded_on_demand() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut set = counting_set(Arc::clone(&calls));
    set.ensure_loaded(&"lib.types".into()).unwrap();
    set.unload_resource(&"lib.types".into());

    let node = set.get_node(&uri("lib.types#//@elements.0")).unwrap();
    assert_eq!(node.name(), Some("Base"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
