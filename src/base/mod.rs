//! Foundation types for the loom toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`ResourceUri`], [`Fragment`], [`Uri`] - Stable node addresses
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - Domain constants (fragment syntax, naming, reference language)
//!
//! This module has NO dependencies on other loom modules besides the error type.

pub mod constants;
mod span;
mod uri;

pub use span::{LineCol, LineIndex, TextRange, TextSize};
pub use uri::{Fragment, FragmentStep, ResourceUri, Uri};

// Re-export text-size types for convenience
pub use text_size;
