//! Qualified names and the policies that compute them.

mod provider;
mod qualified_name;

pub use provider::{NestedNameProvider, QualifiedNameProvider, SimpleNameProvider};
pub use qualified_name::QualifiedName;
