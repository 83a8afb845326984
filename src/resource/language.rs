//! Language-service registry: which parser handles which file extension.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::ResourceUri;
use crate::parser::Parser;

/// Maps file extensions to parsers.
///
/// Owned by a [`ResourceSet`](super::ResourceSet) and handed in at
/// construction; there is no global registry.
#[derive(Clone, Default)]
pub struct LanguageRegistry {
    parsers: IndexMap<SmolStr, Arc<dyn Parser>>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser for every extension it declares.
    pub fn register(&mut self, parser: Arc<dyn Parser>) {
        for extension in parser.file_extensions() {
            self.register_extension(extension, Arc::clone(&parser));
        }
    }

    pub fn register_extension(&mut self, extension: &str, parser: Arc<dyn Parser>) {
        self.parsers
            .insert(SmolStr::new(extension.trim_start_matches('.')), parser);
    }

    pub fn parser_for_extension(&self, extension: &str) -> Option<&Arc<dyn Parser>> {
        self.parsers.get(extension)
    }

    pub fn parser_for(&self, uri: &ResourceUri) -> Option<&Arc<dyn Parser>> {
        uri.file_extension()
            .and_then(|extension| self.parser_for_extension(extension))
    }

    pub fn supports(&self, uri: &ResourceUri) -> bool {
        self.parser_for(uri).is_some()
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(SmolStr::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageRegistry")
            .field("extensions", &self.parsers.keys().collect::<Vec<_>>())
            .finish()
    }
}
