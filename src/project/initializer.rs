//! Preparing a resource set before linking.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::base::ResourceUri;
use crate::model::Package;
use crate::parser::Parser;
use crate::resource::ResourceSet;

/// Optional capability that can supply parsers for extensions the set's
/// language registry does not know.
pub trait LanguageSupport: Send + Sync {
    fn parser_for_extension(&self, extension: &str) -> Option<Arc<dyn Parser>>;
}

/// What [`ResourceSetInitializer::initialize`] did.
#[derive(Debug, Default)]
pub struct InitializeReport {
    pub loaded: Vec<ResourceUri>,
    /// Resources without any language support.
    pub unsupported: Vec<ResourceUri>,
    /// Resources that failed to load and were removed from the set.
    pub removed: Vec<(ResourceUri, String)>,
    /// Packages newly added to the set's registry.
    pub registered_packages: usize,
}

/// Loads the resources a run depends on and registers their metamodels.
pub struct ResourceSetInitializer {
    fallback: Option<Arc<dyn LanguageSupport>>,
}

impl ResourceSetInitializer {
    pub fn new(fallback: Option<Arc<dyn LanguageSupport>>) -> Self {
        if fallback.is_none() {
            debug!("no fallback language support: resources without a registered language are skipped");
        }
        Self { fallback }
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Load every referenced resource through the set's loader.
    ///
    /// An extension without a registered language is looked up in the
    /// fallback capability and registered on success. Resources that fail
    /// to load are removed from the set. Afterwards the metamodel package of
    /// every loaded resource is registered unless its namespace URI is
    /// already taken.
    pub fn initialize(&self, set: &mut ResourceSet, referenced: &[ResourceUri]) -> InitializeReport {
        let mut report = InitializeReport::default();

        for uri in referenced {
            if !self.ensure_language(set, uri) {
                warn!("no language support for '{}'", uri);
                report.unsupported.push(uri.clone());
                continue;
            }
            match set.ensure_loaded(uri) {
                Ok(()) => report.loaded.push(uri.clone()),
                Err(e) => {
                    warn!("removing '{}': {}", uri, e);
                    set.remove_resource(uri);
                    report.removed.push((uri.clone(), e.to_string()));
                }
            }
        }

        let packages: Vec<Arc<Package>> = set
            .resources()
            .filter(|r| r.is_loaded())
            .filter_map(|r| r.parser().map(|p| p.package()))
            .collect();
        for package in packages {
            if set.registry_mut().register_if_absent(package) {
                report.registered_packages += 1;
            }
        }
        report
    }

    fn ensure_language(&self, set: &mut ResourceSet, uri: &ResourceUri) -> bool {
        if set.languages().supports(uri) {
            return true;
        }
        let Some(extension) = uri.file_extension() else {
            return false;
        };
        let Some(parser) = self
            .fallback
            .as_ref()
            .and_then(|f| f.parser_for_extension(extension))
        else {
            return false;
        };
        debug!("registering fallback parser for '.{}'", extension);
        set.languages_mut().register_extension(extension, parser);
        true
    }
}

impl Default for ResourceSetInitializer {
    fn default() -> Self {
        Self::new(None)
    }
}
