use crate::types::Extensions;

/// Human-oriented metadata for a workflow document.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Info {
    /// Title of the collection of workflows the document describes.
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Version of the document itself, not of the Arazzo specification.
    pub version: String,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}
