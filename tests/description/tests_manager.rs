//! Description caching, deltas and affectedness.

use std::sync::Arc;

use loom::description::{DefaultResourceDescriptionStrategy, DescriptionManager};
use loom::naming::SimpleNameProvider;
use loom::resource::ResourceSet;

use crate::helpers::set_helpers::*;

fn manager() -> DescriptionManager {
    DescriptionManager::new(DefaultResourceDescriptionStrategy::new(SimpleNameProvider))
}

fn resource<'a>(set: &'a ResourceSet, uri: &str) -> &'a loom::resource::Resource {
    set.resource(&uri.into())
        .unwrap_or_else(|| panic!("no resource '{uri}'"))
}

// =============================================================================
// CACHE
// =============================================================================

#[test]
fn test_unchanged_resource_hits_the_cache() {
    let set = linked_set(&[("foo.types", "type A extends C;"), ("bar.types", "type C;")]);
    let manager = manager();

    let first = manager.description(resource(&set, "foo.types"));
    let second = manager.description(resource(&set, "foo.types"));

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(manager.cached_count(), 1);
}

#[test]
fn test_new_stamp_recomputes() {
    let mut set = set_from_sources(&[("foo.types", "type A extends C;"), ("bar.types", "type C;")]);
    let manager = manager();
    let before = manager.description(resource(&set, "foo.types"));
    assert!(before.reference_descriptions().is_empty());

    link(&mut set);

    let after = manager.description(resource(&set, "foo.types"));
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(after.reference_descriptions().len(), 1);
    assert!(Arc::ptr_eq(
        &after,
        &manager.cached(&"foo.types".into()).unwrap()
    ));
}

#[test]
fn test_invalidate_forces_recomputation() {
    let set = linked_set(&[("foo.types", "type A;")]);
    let manager = manager();
    let first = manager.description(resource(&set, "foo.types"));

    assert!(manager.invalidate(&"foo.types".into()));
    assert!(!manager.invalidate(&"foo.types".into()));

    let second = manager.description(resource(&set, "foo.types"));
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
}

#[test]
fn test_describe_all_follows_set_order() {
    let files: Vec<(String, String)> = (0..24)
        .map(|i| (format!("r{i:02}.types"), format!("type T{i} extends T{};", (i + 1) % 24)))
        .collect();
    let borrowed: Vec<(&str, &str)> = files.iter().map(|(u, t)| (u.as_str(), t.as_str())).collect();
    let set = linked_set(&borrowed);
    let manager = manager();

    let descriptions = manager.describe_all(&set);

    let uris: Vec<&str> = descriptions.iter().map(|d| d.uri().as_str()).collect();
    let expected: Vec<&str> = borrowed.iter().map(|(u, _)| *u).collect();
    assert_eq!(uris, expected);
    assert!(descriptions.iter().all(|d| d.reference_descriptions().len() == 1));
    assert_eq!(manager.cached_count(), 24);

    manager.clear();
    assert_eq!(manager.cached_count(), 0);
}

// =============================================================================
// DELTAS
// =============================================================================

#[test]
fn test_first_delta_is_an_addition() {
    let set = linked_set(&[("foo.types", "type A;")]);
    let manager = manager();

    let delta = manager.create_delta(resource(&set, "foo.types"));

    assert!(delta.old.is_none());
    assert!(delta.new.is_some());
    assert!(delta.has_changes());
}

#[test]
fn test_same_exports_after_reload_are_no_change() {
    let mut set = linked_set(&[("foo.types", "type A;")]);
    let manager = manager();
    manager.description(resource(&set, "foo.types"));

    set.load_resource("foo.types", "type A;").unwrap();
    let delta = manager.create_delta(resource(&set, "foo.types"));

    assert!(!delta.has_changes());
    assert_ne!(
        delta.old.as_ref().unwrap().modification_stamp(),
        delta.new.as_ref().unwrap().modification_stamp()
    );
}

#[test]
fn test_changed_exports_are_a_change() {
    let mut set = linked_set(&[("foo.types", "type A;")]);
    let manager = manager();
    manager.description(resource(&set, "foo.types"));

    set.load_resource("foo.types", "type A; type B;").unwrap();
    let delta = manager.create_delta(resource(&set, "foo.types"));

    assert!(delta.has_changes());
    let names: Vec<String> = delta.exported_objects().map(|o| o.name().to_string()).collect();
    assert_eq!(names, ["A", "A", "B"]);
}

#[test]
fn test_removal_delta_drops_the_cache_entry() {
    let set = linked_set(&[("foo.types", "type A;")]);
    let manager = manager();
    manager.description(resource(&set, "foo.types"));

    let delta = manager.removal_delta(&"foo.types".into());

    assert!(delta.old.is_some());
    assert!(delta.new.is_none());
    assert!(delta.has_changes());
    assert_eq!(manager.cached_count(), 0);
}

// =============================================================================
// AFFECTEDNESS
// =============================================================================

#[test]
fn test_importer_of_changed_name_is_affected() {
    let mut set = linked_set(&[
        ("foo.types", "type A extends C;"),
        ("bar.types", "type C;"),
        ("baz.types", "type Z;"),
    ]);
    let manager = manager();
    manager.describe_all(&set);

    set.load_resource("bar.types", "type C; type D;").unwrap();
    let deltas = [manager.create_delta(resource(&set, "bar.types"))];

    let foo = manager.description(resource(&set, "foo.types"));
    let baz = manager.description(resource(&set, "baz.types"));
    assert!(manager.is_affected(&deltas, &foo));
    assert!(!manager.is_affected(&deltas, &baz));
}

#[test]
fn test_importer_of_newly_exported_name_is_affected() {
    let mut set = linked_set(&[
        ("foo.types", "type A extends Later;"),
        ("bar.types", "type C;"),
    ]);
    let manager = manager();
    manager.describe_all(&set);

    set.load_resource("bar.types", "type C; type Later;").unwrap();
    let deltas = [manager.create_delta(resource(&set, "bar.types"))];

    let foo = manager.description(resource(&set, "foo.types"));
    assert!(manager.is_affected(&deltas, &foo));
}

#[test]
fn test_removed_target_resource_affects_its_referrers() {
    let mut set = linked_set(&[("foo.types", "type A extends C;"), ("bar.types", "type C;")]);
    let manager = manager();
    manager.describe_all(&set);
    let foo_before = manager.description(resource(&set, "foo.types"));

    set.remove_resource(&"bar.types".into());
    let deltas = [manager.removal_delta(&"bar.types".into())];

    assert!(manager.is_affected(&deltas, &foo_before));
}

#[test]
fn test_unchanged_or_own_deltas_affect_nothing() {
    let set = linked_set(&[("foo.types", "type A extends C;"), ("bar.types", "type C;")]);
    let manager = manager();
    manager.describe_all(&set);

    let unchanged = [manager.create_delta(resource(&set, "bar.types"))];
    let foo = manager.description(resource(&set, "foo.types"));
    assert!(!unchanged[0].has_changes());
    assert!(!manager.is_affected(&unchanged, &foo));

    let own = [manager.removal_delta(&"foo.types".into())];
    assert!(!manager.is_affected(&own, &foo));
}
