use crate::types::{AnyValue, Extensions};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,

    /// Payload value; strings inside may be runtime expressions or embedded
    /// templates, resolved at execution time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<AnyValue>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}
