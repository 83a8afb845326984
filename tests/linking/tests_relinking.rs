//! Relinking after reference targets go away or come back.

use loom::model::{Proxy, Reference};
use loom::naming::QualifiedName;
use loom::linking::LinkingOutcome;
use loom::resource::{ResourceSet, codes};
use loom::{Error, ResourceUri};

use crate::helpers::set_helpers::*;

const FOO: (&str, &str) = ("foo.types", "type A extends C;");
const BAR: (&str, &str) = ("bar.types", "type C;");

fn extends_of_a(set: &ResourceSet) -> Reference {
    set.node(&uri("foo.types#//@elements.0"))
        .unwrap()
        .references("extends")[0]
        .clone()
}

fn implements_of_a(set: &ResourceSet) -> Vec<Reference> {
    set.node(&uri("foo.types#//@elements.0"))
        .unwrap()
        .references("implements")
        .to_vec()
}

fn name_at(set: &ResourceSet, target: &str) -> Option<String> {
    set.node(&uri(target))
        .and_then(|node| node.name().map(str::to_string))
}

/// A set that can demand-load `bar.types` with `text`.
fn set_with_bar_loader(text: &'static str) -> ResourceSet {
    types_set().with_loader(move |uri: &ResourceUri| -> loom::Result<String> {
        match uri.as_str() {
            "bar.types" => Ok(text.to_string()),
            _ => Err(Error::ResourceNotFound(uri.clone())),
        }
    })
}

/// Bind `A implements` to `target` without going through a name.
fn implement_directly(set: &mut ResourceSet, target: &str) {
    let a = set.node(&uri("foo.types#//@elements.0")).unwrap().id();
    let target = uri(target);
    set.edit_resource(&"foo.types".into(), |tree| {
        tree.add_reference(a, "implements", Reference::Bound(target))
    })
    .unwrap();
}

// =============================================================================
// REMOVAL
// =============================================================================

#[test]
fn test_removing_target_demotes_reference_to_its_written_name() {
    let mut set = linked_set(&[FOO, BAR]);
    let stamp = set.resource(&"foo.types".into()).unwrap().modification_stamp();

    let removed = set.remove_resource(&"bar.types".into());

    assert!(removed.is_some());
    assert_eq!(
        extends_of_a(&set),
        Reference::Unresolved(Proxy::Name(QualifiedName::single("C")))
    );
    let foo = set.resource(&"foo.types".into()).unwrap();
    assert_eq!(foo.unresolved().len(), 1);
    assert_ne!(foo.modification_stamp(), stamp);
}

#[test]
fn test_relink_after_removal_reports_the_lost_target() {
    let mut set = linked_set(&[FOO, BAR]);
    set.remove_resource(&"bar.types".into());

    let outcome = link(&mut set);

    assert_eq!(outcome.bound, 0);
    assert_eq!(outcome.unresolved, 1);
    let diagnostics = diagnostics_of(&set, "foo.types");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_deref(), Some(codes::UNRESOLVED_REFERENCE));
    assert_eq!(
        &*diagnostics[0].message,
        "couldn't resolve reference to Type 'C'"
    );
}

#[test]
fn test_re_adding_target_binds_again_and_clears_the_diagnostic() {
    let mut set = linked_set(&[FOO, BAR]);
    set.remove_resource(&"bar.types".into());
    link(&mut set);

    set.load_resource(BAR.0, BAR.1).unwrap();
    let outcome = link(&mut set);

    assert_eq!(outcome.bound, 1);
    assert_eq!(extends_of_a(&set), Reference::Bound(uri("bar.types#//@elements.0")));
    assert!(diagnostics_of(&set, "foo.types").is_empty());
}

#[test]
fn test_removed_target_is_demand_loaded_when_a_loader_exists() {
    let mut set = set_with_bar_loader(BAR.1);
    set.load_resource(FOO.0, "type A;").unwrap();
    set.load_resource(BAR.0, BAR.1).unwrap();
    implement_directly(&mut set, "bar.types#//@elements.0");
    set.remove_resource(&"bar.types".into());
    assert_eq!(set.len(), 1);
    assert_eq!(
        implements_of_a(&set),
        vec![Reference::Unresolved(Proxy::Uri(uri("bar.types#//@elements.0")))]
    );

    let outcome = link(&mut set);

    assert_eq!(outcome.bound, 1);
    assert_eq!(outcome.unresolved, 0);
    assert!(set.contains(&"bar.types".into()));
    assert_eq!(
        implements_of_a(&set),
        vec![Reference::Bound(uri("bar.types#//@elements.0"))]
    );
}

#[test]
fn test_name_proxies_do_not_demand_load() {
    let mut set = set_with_bar_loader(BAR.1);
    set.load_resource(FOO.0, FOO.1).unwrap();
    set.load_resource(BAR.0, BAR.1).unwrap();
    link(&mut set);
    set.remove_resource(&"bar.types".into());

    let outcome = link(&mut set);

    assert_eq!(outcome.unresolved, 1);
    assert!(!set.contains(&"bar.types".into()));
}

// =============================================================================
// UNLOAD / RELOAD
// =============================================================================

#[test]
fn test_unloading_target_demotes_references() {
    let mut set = linked_set(&[FOO, BAR]);

    set.unload_resource(&"bar.types".into());

    assert!(!extends_of_a(&set).is_bound());
    let outcome = link(&mut set);
    assert_eq!(outcome.unresolved, 1);
}

#[test]
fn test_reloading_target_relinks_against_new_content() {
    let mut set = linked_set(&[FOO, BAR]);

    set.load_resource("bar.types", "type C; type Extra;").unwrap();
    assert!(!extends_of_a(&set).is_bound());

    let outcome = link(&mut set);
    assert_eq!(outcome.bound, 1);
    assert_eq!(extends_of_a(&set), Reference::Bound(uri("bar.types#//@elements.0")));
}

#[test]
fn test_reloading_reordered_target_binds_the_same_name() {
    let mut set = linked_set(&[FOO, BAR]);

    set.load_resource("bar.types", "type X; type C;").unwrap();
    assert_eq!(
        extends_of_a(&set),
        Reference::Unresolved(Proxy::Name(QualifiedName::single("C")))
    );

    let outcome = link(&mut set);
    assert_eq!(outcome.bound, 1);
    assert_eq!(extends_of_a(&set), Reference::Bound(uri("bar.types#//@elements.1")));
    assert_eq!(name_at(&set, "bar.types#//@elements.1").as_deref(), Some("C"));
}

#[test]
fn test_reloading_target_without_the_node_leaves_reference_unresolved() {
    let mut set = linked_set(&[FOO, BAR]);

    set.load_resource("bar.types", "").unwrap();
    let outcome = link(&mut set);

    assert_eq!(outcome.bound, 0);
    assert_eq!(outcome.unresolved, 1);
    assert_eq!(set.resource(&"foo.types".into()).unwrap().errors().count(), 1);
}

#[test]
fn test_reloading_the_source_starts_from_fresh_proxies() {
    let mut set = linked_set(&[FOO, BAR]);

    set.load_resource("foo.types", "type A extends C; type B extends C;").unwrap();
    assert_eq!(set.resource(&"foo.types".into()).unwrap().unresolved().len(), 2);

    let outcome = link(&mut set);
    assert_eq!(outcome.bound, 2);
}

#[test]
fn test_unload_then_relink_is_idempotent() {
    let mut set = set_with_bar_loader("type C extends A;");
    set.load_resource("bar.types", "type C extends A;").unwrap();
    set.load_resource(FOO.0, FOO.1).unwrap();
    link(&mut set);

    set.unload_resource(&"bar.types".into());
    let first = link(&mut set);
    let second = link(&mut set);

    assert_eq!(first.unresolved, second.unresolved);
    assert_eq!(second.bound, 0);
}

#[test]
fn test_target_demand_loaded_behind_the_run_is_linked_in_the_same_run() {
    let mut set = set_with_bar_loader("type C extends A;");
    set.load_resource("bar.types", "type C extends A;").unwrap();
    set.load_resource(FOO.0, "type A;").unwrap();
    link(&mut set);
    implement_directly(&mut set, "bar.types#//@elements.0");
    set.unload_resource(&"bar.types".into());

    // foo's URI proxy reloads bar after the run has already skipped it.
    let first = link(&mut set);

    assert_eq!(first.bound, 2);
    assert_eq!(first.unresolved, 0);
    assert_eq!(
        set.node(&uri("bar.types#//@elements.0"))
            .unwrap()
            .references("extends")[0],
        Reference::Bound(uri("foo.types#//@elements.0"))
    );
    assert_eq!(link(&mut set), LinkingOutcome::default());
}

// =============================================================================
// EDITS
// =============================================================================

#[test]
fn test_detaching_a_sibling_keeps_references_on_their_target() {
    let mut set = linked_set(&[FOO, ("bar.types", "type B; type C; type D;")]);
    assert_eq!(extends_of_a(&set), Reference::Bound(uri("bar.types#//@elements.1")));
    let b = set.node(&uri("bar.types#//@elements.0")).unwrap().id();

    set.edit_resource(&"bar.types".into(), |tree| tree.detach(b)).unwrap();

    assert_eq!(extends_of_a(&set), Reference::Bound(uri("bar.types#//@elements.0")));
    assert_eq!(name_at(&set, "bar.types#//@elements.0").as_deref(), Some("C"));
    let description = describe(&set, "foo.types");
    assert_eq!(
        description.reference_descriptions()[0].target_uri(),
        &uri("bar.types#//@elements.0")
    );
    assert_eq!(link(&mut set), LinkingOutcome::default());
}

#[test]
fn test_detaching_the_target_demotes_to_its_name() {
    let mut set = linked_set(&[FOO, ("bar.types", "type B; type C; type D;")]);
    let c = set.node(&uri("bar.types#//@elements.1")).unwrap().id();

    set.edit_resource(&"bar.types".into(), |tree| tree.detach(c)).unwrap();

    assert_eq!(
        extends_of_a(&set),
        Reference::Unresolved(Proxy::Name(QualifiedName::single("C")))
    );
    let outcome = link(&mut set);
    assert_eq!(outcome.unresolved, 1);
    assert_eq!(
        &*diagnostics_of(&set, "foo.types")[0].message,
        "couldn't resolve reference to Type 'C'"
    );
}

#[test]
fn test_edit_of_unknown_resource_fails() {
    let mut set = linked_set(&[FOO]);
    let result = set.edit_resource(&"bar.types".into(), |_| Ok(()));
    assert!(matches!(result, Err(Error::ResourceNotFound(_))));
}
