use smol_str::SmolStr;

use crate::base::Uri;
use crate::naming::QualifiedName;

/// One outgoing reference of a resource, as seen by the index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReferenceDescription {
    source: Uri,
    target: Uri,
    feature: SmolStr,
    index: Option<usize>,
    container: Option<Uri>,
}

impl ReferenceDescription {
    /// Value of [`index_in_list`](Self::index_in_list) for single-valued features.
    pub const NOT_A_LIST: isize = -1;

    pub fn new(
        source: Uri,
        target: Uri,
        feature: impl Into<SmolStr>,
        index: Option<usize>,
        container: Option<Uri>,
    ) -> Self {
        Self {
            source,
            target,
            feature: feature.into(),
            index,
            container,
        }
    }

    /// URI of the node holding the reference.
    pub fn source_uri(&self) -> &Uri {
        &self.source
    }

    pub fn target_uri(&self) -> &Uri {
        &self.target
    }

    /// Name of the reference feature.
    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// Position in a multi-valued feature; `None` for single-valued ones.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Position in a multi-valued feature, or [`NOT_A_LIST`](Self::NOT_A_LIST).
    pub fn index_in_list(&self) -> isize {
        self.index
            .map(|i| i as isize)
            .unwrap_or(Self::NOT_A_LIST)
    }

    /// URI of the nearest exported ancestor-or-self of the source.
    pub fn container_uri(&self) -> Option<&Uri> {
        self.container.as_ref()
    }
}

/// A node reachable by name from other resources.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExportedObject {
    name: QualifiedName,
    uri: Uri,
    classifier: SmolStr,
}

impl ExportedObject {
    pub fn new(name: QualifiedName, uri: Uri, classifier: impl Into<SmolStr>) -> Self {
        Self {
            name,
            uri,
            classifier: classifier.into(),
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Name of the node's classifier.
    pub fn classifier(&self) -> &str {
        &self.classifier
    }
}
