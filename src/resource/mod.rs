//! Resources and resource sets.
//!
//! A [`Resource`] owns the node tree parsed from one source unit. A
//! [`ResourceSet`] owns many resources, dereferences URIs across them and
//! demand-loads missing ones through a [`ResourceLoader`](crate::project::ResourceLoader).

mod diagnostics;
mod language;
#[allow(clippy::module_inception)]
mod resource;
mod resource_set;

pub use diagnostics::{Diagnostic, DiagnosticKind, Severity, codes};
pub use language::LanguageRegistry;
pub use resource::{LoadState, ParseResult, Resource};
pub use resource_set::ResourceSet;
