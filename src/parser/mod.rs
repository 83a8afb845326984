//! Parser collaborator interface and the bundled reference language.
//!
//! The resource layer never knows a concrete grammar. It hands source text
//! to a [`Parser`] and gets back a node tree, the references the parser
//! could not bind, and syntax diagnostics:
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens
//!     ↓
//! Parser → Tree + UnresolvedReferences + Diagnostics
//!     ↓
//! Resource (installed, ready for linking)
//! ```
//!
//! [`TypesLanguage`] is a small language (`type A extends B implements C, D`)
//! used to drive the resource, linking and description layers end to end.

mod lexer;
mod types_lang;

use std::sync::Arc;

pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use types_lang::{TypesLanguage, TypesMetamodel};

use crate::model::{Package, Tree, UnresolvedReference};
use crate::resource::Diagnostic;

/// Everything one parse produces.
#[derive(Clone, Debug, Default)]
pub struct ParseOutput {
    pub tree: Tree,
    /// References written as names, in any order.
    pub unresolved: Vec<UnresolvedReference>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn new(tree: Tree) -> Self {
        Self {
            tree,
            unresolved: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_unresolved(mut self, unresolved: Vec<UnresolvedReference>) -> Self {
        self.unresolved = unresolved;
        self
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// A grammar-aware parser for one language.
pub trait Parser: Send + Sync {
    /// The metamodel the produced nodes are instances of.
    fn package(&self) -> Arc<Package>;

    /// File extensions (without the dot) this parser handles.
    fn file_extensions(&self) -> &[&str];

    /// Parse text into a tree. Never fails: syntax problems become
    /// diagnostics and the tree holds whatever could be recovered.
    fn parse(&self, text: &str) -> ParseOutput;
}
