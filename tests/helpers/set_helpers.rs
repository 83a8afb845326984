//! Resource set setup helpers.

use std::sync::Arc;

use loom::Uri;
use loom::description::{DefaultResourceDescriptionStrategy, ResourceDescription};
use loom::linking::{GlobalScopeProvider, LinkingOutcome, resolve_lazy_cross_references};
use loom::model::Registry;
use loom::naming::SimpleNameProvider;
use loom::parser::TypesLanguage;
use loom::resource::{Diagnostic, LanguageRegistry, ResourceSet};
use tokio_util::sync::CancellationToken;

/// A language registry that knows `.types` files.
pub fn types_languages() -> LanguageRegistry {
    let mut languages = LanguageRegistry::new();
    languages.register(Arc::new(TypesLanguage::new()));
    languages
}

/// An empty set that parses `.types` files.
pub fn types_set() -> ResourceSet {
    ResourceSet::new(Registry::new(), types_languages())
}

/// A set holding one loaded resource per `(uri, text)` pair, in order.
/// Panics on syntax errors.
pub fn set_from_sources(files: &[(&str, &str)]) -> ResourceSet {
    let mut set = types_set();
    for (uri, text) in files {
        let result = set.load_resource(*uri, text).expect("resource should load");
        assert!(
            result.is_success(),
            "Parse errors in '{}': {:?}",
            uri,
            result.errors
        );
    }
    set
}

/// Run the linker with the global scope and a fresh token.
pub fn link(set: &mut ResourceSet) -> LinkingOutcome {
    resolve_lazy_cross_references(
        set,
        &GlobalScopeProvider::new(SimpleNameProvider),
        &CancellationToken::new(),
    )
}

/// Load and link in one go.
pub fn linked_set(files: &[(&str, &str)]) -> ResourceSet {
    let mut set = set_from_sources(files);
    link(&mut set);
    set
}

/// Describe one resource of the set with the default strategy.
pub fn describe(set: &ResourceSet, uri: &str) -> ResourceDescription {
    let resource = set
        .resource(&uri.into())
        .unwrap_or_else(|| panic!("no resource '{uri}'"));
    ResourceDescription::compute(resource, &DefaultResourceDescriptionStrategy::new(SimpleNameProvider))
}

/// Parse a node URI.
pub fn uri(text: &str) -> Uri {
    text.parse().unwrap_or_else(|e| panic!("bad URI '{text}': {e}"))
}

/// All diagnostics of one resource, cloned.
pub fn diagnostics_of(set: &ResourceSet, resource: &str) -> Vec<Diagnostic> {
    set.resource(&resource.into())
        .map(|r| r.diagnostics().cloned().collect())
        .unwrap_or_default()
}
