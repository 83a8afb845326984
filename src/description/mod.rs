//! Resource descriptions: what a resource exports and what it references.
//!
//! Descriptions are pure reads over a loaded [`Resource`](crate::resource::Resource).
//! The [`DescriptionManager`] caches them per modification stamp and
//! computes them for many resources in parallel; the [`ReferenceIndex`]
//! answers find-references queries over a whole set.

mod delta;
mod index;
#[cfg(feature = "interchange")]
pub mod interchange;
mod manager;
mod reference;
mod resource_description;
mod strategy;

pub use delta::Delta;
pub use index::ReferenceIndex;
pub use manager::DescriptionManager;
pub use reference::{ExportedObject, ReferenceDescription};
pub use resource_description::ResourceDescription;
pub use strategy::{
    DefaultResourceDescriptionStrategy, DerivedReferences, DescriptionPolicy,
    ResourceDescriptionStrategy, is_indexable,
};
