//! Error types for resource model operations.
//!
//! Structural and identity errors are returned to the caller of the mutating
//! operation. Unresolved references and syntax problems are never errors: they
//! are collected as [`Diagnostic`](crate::resource::Diagnostic)s on the
//! owning resource.

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::ResourceUri;
use crate::model::{FeatureKind, NodeId};

/// Errors that can occur while building, loading or linking resources.
#[derive(Debug, Error)]
pub enum Error {
    /// A graph invariant would be violated. The tree is left unchanged.
    #[error("invalid structure: {0}")]
    InvalidStructure(#[from] StructureViolation),

    /// A resource with the same URI is already part of the set.
    #[error("duplicate resource: {0}")]
    DuplicateResource(ResourceUri),

    /// The resource is neither in the set nor loadable.
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceUri),

    /// No language is registered for the resource's file extension.
    #[error("no language registered for resource '{0}'")]
    NoLanguage(ResourceUri),

    /// Malformed URI or fragment.
    #[error("invalid URI '{uri}': {message}")]
    InvalidUri { uri: String, message: String },

    /// IO error while reading a resource.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[cfg(feature = "interchange")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid URI error.
    pub fn invalid_uri(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            message: message.into(),
        }
    }
}

/// The graph invariant a rejected operation would have broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureViolation {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("classifier '{classifier}' has no feature '{feature}'")]
    UnknownFeature { classifier: SmolStr, feature: SmolStr },

    #[error("feature '{feature}' is {found:?}, expected {expected:?}")]
    WrongFeatureKind {
        feature: SmolStr,
        expected: FeatureKind,
        found: FeatureKind,
    },

    #[error("attaching {child} under {container} would create a containment cycle")]
    Cycle { child: NodeId, container: NodeId },

    #[error("node {0} already has a container")]
    AlreadyContained(NodeId),

    #[error("the root node cannot be attached to a container")]
    AttachRoot,

    #[error("node {0} has no container")]
    NotContained(NodeId),

    #[error("single-valued feature '{0}' already holds a value")]
    CardinalityExceeded(SmolStr),

    #[error("feature '{0}' is multi-valued")]
    NotSingleValued(SmolStr),

    #[error("index {index} is out of bounds for feature '{feature}' of length {len}")]
    IndexOutOfBounds {
        feature: SmolStr,
        index: usize,
        len: usize,
    },

    #[error("feature '{feature}' expects '{expected}', got '{found}'")]
    TypeMismatch {
        feature: SmolStr,
        expected: SmolStr,
        found: SmolStr,
    },
}

/// Convenience alias for results using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
