//! JSON rendering of resource descriptions for tooling layers.

use serde::{Deserialize, Serialize};

use super::reference::{ExportedObject, ReferenceDescription};
use super::resource_description::ResourceDescription;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptionDto {
    pub uri: String,
    pub exported: Vec<ExportedObjectDto>,
    pub references: Vec<ReferenceDescriptionDto>,
    pub imported_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedObjectDto {
    pub name: String,
    pub uri: String,
    pub classifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDescriptionDto {
    pub source: String,
    pub target: String,
    pub feature: String,
    /// `-1` for single-valued features.
    pub index_in_list: isize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

impl From<&ExportedObject> for ExportedObjectDto {
    fn from(object: &ExportedObject) -> Self {
        Self {
            name: object.name().to_string(),
            uri: object.uri().to_string(),
            classifier: object.classifier().to_string(),
        }
    }
}

impl From<&ReferenceDescription> for ReferenceDescriptionDto {
    fn from(reference: &ReferenceDescription) -> Self {
        Self {
            source: reference.source_uri().to_string(),
            target: reference.target_uri().to_string(),
            feature: reference.feature().to_string(),
            index_in_list: reference.index_in_list(),
            container: reference.container_uri().map(ToString::to_string),
        }
    }
}

impl From<&ResourceDescription> for ResourceDescriptionDto {
    fn from(description: &ResourceDescription) -> Self {
        Self {
            uri: description.uri().to_string(),
            exported: description.exported_objects().iter().map(Into::into).collect(),
            references: description
                .reference_descriptions()
                .iter()
                .map(Into::into)
                .collect(),
            imported_names: description
                .imported_names()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Render a description as pretty-printed JSON.
pub fn to_json(description: &ResourceDescription) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ResourceDescriptionDto::from(
        description,
    ))?)
}

/// Parse JSON produced by [`to_json`].
pub fn from_json(json: &str) -> Result<ResourceDescriptionDto> {
    Ok(serde_json::from_str(json)?)
}
