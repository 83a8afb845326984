//! Object graph model.
//!
//! Typed nodes live in a per-resource arena ([`Tree`]) and are described by a
//! metamodel ([`Classifier`], [`FeatureDef`], [`Package`]). Every node feature
//! holds one of three kinds of values:
//!
//! - attributes: scalar [`Value`]s
//! - containments: owned child nodes (the containment graph is a tree)
//! - references: weak [`Reference`]s to nodes anywhere in the resource set,
//!   either bound to a [`Uri`](crate::base::Uri) or still an unresolved [`Proxy`]

mod metamodel;
mod node;
mod registry;
mod tree;
mod value;

pub use metamodel::{Classifier, ClassifierBuilder, FeatureDef, FeatureId, FeatureKind, Package};
pub use node::NodeRef;
pub use registry::Registry;
pub use tree::{NodeId, Tree};
pub use value::{Proxy, Reference, SlotKey, UnresolvedReference, Value};
