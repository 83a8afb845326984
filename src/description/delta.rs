use std::sync::Arc;

use super::resource_description::ResourceDescription;
use crate::base::ResourceUri;

/// The change of one resource's description between two points in time.
///
/// `old` is `None` for an added resource, `new` is `None` for a removed one.
#[derive(Clone, Debug)]
pub struct Delta {
    pub uri: ResourceUri,
    pub old: Option<Arc<ResourceDescription>>,
    pub new: Option<Arc<ResourceDescription>>,
}

impl Delta {
    pub fn new(
        uri: ResourceUri,
        old: Option<Arc<ResourceDescription>>,
        new: Option<Arc<ResourceDescription>>,
    ) -> Self {
        Self { uri, old, new }
    }

    /// True if the exported objects changed. Reference changes alone never
    /// affect other resources.
    pub fn has_changes(&self) -> bool {
        match (&self.old, &self.new) {
            (None, None) => false,
            (Some(old), Some(new)) => {
                !Arc::ptr_eq(old, new) && old.exported_objects() != new.exported_objects()
            }
            _ => true,
        }
    }

    /// Exported objects before and after the change.
    pub fn exported_objects(&self) -> impl Iterator<Item = &super::ExportedObject> {
        self.old
            .iter()
            .chain(self.new.iter())
            .flat_map(|d| d.exported_objects())
    }
}
