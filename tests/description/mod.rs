//! Resource description tests
//!
//! Tests for what a resource exports and which of its references are
//! recorded:
//! - Reference description rules per feature flavour
//! - Exported objects and naming policies
//! - Description caching and change deltas
//! - The reference index
//! - JSON interchange

pub mod tests_manager;
