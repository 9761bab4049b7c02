use crate::types::{Extensions, Info, SourceDescription, Workflow};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ArazzoDocument {
    /// The Arazzo Specification version (e.g. "1.0.1").
    pub arazzo: String,

    pub info: Info,

    #[serde(rename = "sourceDescriptions")]
    pub source_descriptions: Vec<SourceDescription>,

    pub workflows: Vec<Workflow>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl ArazzoDocument {
    pub fn workflow(&self, workflow_id: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.workflow_id == workflow_id)
    }
}
