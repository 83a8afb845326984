//! Cross-reference linking.
//!
//! Parsers leave references they cannot bind as proxies.
//! [`resolve_lazy_cross_references`] binds them later, once every resource
//! that might hold a target is part of the set (or can be demand-loaded).

mod resolver;
mod scope;

pub use resolver::{LinkingOutcome, resolve_lazy_cross_references};
pub use scope::{GlobalScopeProvider, ScopeProvider};
