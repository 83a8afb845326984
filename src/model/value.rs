//! Feature values: attribute scalars and (possibly unresolved) references.

use std::fmt;

use smol_str::SmolStr;

use super::metamodel::FeatureId;
use super::tree::NodeId;
use crate::base::Uri;
use crate::naming::QualifiedName;

/// Scalar attribute data.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    String(SmolStr),
    Int(i64),
    Bool(bool),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(SmolStr::new(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(SmolStr::from(s))
    }
}

impl From<SmolStr> for Value {
    fn from(s: SmolStr) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

// ============================================================================
// REFERENCES
// ============================================================================

/// Stand-in for a reference target that is not bound yet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Proxy {
    /// A name written in the source text, resolved through the scope provider.
    Name(QualifiedName),
    /// A known address, dereferenced through the resource set.
    Uri(Uri),
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Proxy::Name(name) => write!(f, "{name}"),
            Proxy::Uri(uri) => write!(f, "{uri}"),
        }
    }
}

/// Value of a non-containment reference slot.
///
/// Only the linker turns `Unresolved` into `Bound`. Removing, unloading or
/// reloading the target's resource turns `Bound` back into `Unresolved`, with
/// the name the linker bound it from or else the old target URI.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reference {
    Bound(Uri),
    Unresolved(Proxy),
}

impl Reference {
    pub fn is_bound(&self) -> bool {
        matches!(self, Reference::Bound(_))
    }

    /// The target, if bound.
    pub fn target(&self) -> Option<&Uri> {
        match self {
            Reference::Bound(uri) => Some(uri),
            Reference::Unresolved(_) => None,
        }
    }

    pub fn proxy(&self) -> Option<&Proxy> {
        match self {
            Reference::Bound(_) => None,
            Reference::Unresolved(proxy) => Some(proxy),
        }
    }
}

/// A reference slot waiting for the linker.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnresolvedReference {
    /// The node holding the slot.
    pub source: NodeId,
    pub feature: FeatureId,
    /// Position in the slot for multi-valued features.
    pub index: Option<usize>,
    pub proxy: Proxy,
}

impl UnresolvedReference {
    /// Key identifying the slot, independent of the proxy.
    pub fn slot(&self) -> SlotKey {
        SlotKey {
            source: self.source,
            feature: self.feature,
            index: self.index,
        }
    }
}

/// Identifies one reference value: node, feature, and list position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub source: NodeId,
    pub feature: FeatureId,
    pub index: Option<usize>,
}
