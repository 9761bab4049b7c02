use std::collections::BTreeMap;

use crate::types::{Extensions, JsonSchema, RuntimeExpression, Step};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Workflow {
    #[serde(rename = "workflowId")]
    pub workflow_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON Schema for the workflow inputs. Property-level `default` values
    /// seed any input the caller omits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<JsonSchema>,

    pub steps: Vec<Step>,

    /// Workflow-level outputs: name -> runtime expression evaluated once the
    /// final step completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<BTreeMap<String, RuntimeExpression>>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl Workflow {
    /// Default input values declared in the inputs schema, keyed by property
    /// name.
    pub fn input_defaults(&self) -> BTreeMap<String, serde_json::Value> {
        let mut defaults = BTreeMap::new();
        let Some(props) = self
            .inputs
            .as_ref()
            .and_then(|s| s.get("properties"))
            .and_then(|p| p.as_object())
        else {
            return defaults;
        };
        for (name, schema) in props {
            if let Some(default) = schema.get("default") {
                defaults.insert(name.clone(), default.clone());
            }
        }
        defaults
    }
}
