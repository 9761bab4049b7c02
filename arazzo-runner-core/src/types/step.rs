use std::collections::BTreeMap;

use crate::types::{Criterion, Extensions, Parameter, RequestBody, RuntimeExpression};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "stepId")]
    pub step_id: String,

    /// Operation reference by id, either bare (`getUser`) or qualified
    /// (`$sourceDescriptions.api.getUser`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,

    /// Operation reference by location, e.g.
    /// `{$sourceDescriptions.api.url}#/paths/~1users~1{id}/get`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "operationPath")]
    pub operation_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "successCriteria")]
    pub success_criteria: Option<Vec<Criterion>>,

    /// Step outputs: name -> runtime expression evaluated against the
    /// operation response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<BTreeMap<String, RuntimeExpression>>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}
