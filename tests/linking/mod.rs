//! Linker tests
//!
//! Tests for lazy cross-reference resolution:
//! - Binding by name within and across resources
//! - Unresolved and ambiguous reference diagnostics
//! - Idempotence and determinism of repeated runs
//! - Cancellation
//! - Relinking after targets are removed, unloaded or reloaded

pub mod tests_cancellation;
pub mod tests_relinking;
