//! # loom-base
//!
//! Core resource model for textual language workbenches: parse source files
//! into typed node graphs, link cross-references lazily across files, and
//! describe each resource's exported names and outgoing references for
//! indexing.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project     → Resource loading from disk, workspace loading, set initialization
//!   ↓
//! description → Exported objects, reference descriptions, caching, reference index
//!   ↓
//! linking     → Lazy cross-reference resolution, scope providers
//!   ↓
//! resource    → Resource, ResourceSet, diagnostics, language registry
//!   ↓
//! parser      → Parser collaborator trait, logos lexer, reference language
//!   ↓
//! naming      → QualifiedName, naming policies
//!   ↓
//! model       → Metamodel, arena node trees, references and proxies
//!   ↓
//! base        → Primitives (Uri, Fragment, TextRange, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → model → naming → parser → resource → linking → description → project)
// ============================================================================

/// Foundation types: URIs, fragments, text ranges
pub mod base;

/// Object graph model: classifiers, features, node trees
pub mod model;

/// Qualified names and naming policies
pub mod naming;

/// Parser trait and the bundled types language
pub mod parser;

/// Resources, resource sets and diagnostics
pub mod resource;

/// Lazy cross-reference resolution
pub mod linking;

/// Resource and reference descriptions, description cache, reference index
pub mod description;

/// Resource loaders and resource-set setup
pub mod project;

mod error;

pub use error::{Error, Result, StructureViolation};

// Re-export foundation types
pub use base::{Fragment, LineCol, LineIndex, ResourceUri, TextRange, TextSize, Uri};
