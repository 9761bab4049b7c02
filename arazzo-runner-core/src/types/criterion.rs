use crate::types::{Extensions, RuntimeExpression};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionType {
    Simple,
    Regex,
    Jsonpath,
}

/// A success assertion evaluated against a step's response.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Criterion {
    /// Runtime expression supplying the value the condition applies to.
    /// Required for `regex` and `jsonpath` criteria.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<RuntimeExpression>,

    pub condition: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<CriterionType>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}
