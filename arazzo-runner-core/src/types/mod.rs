mod common;
mod criterion;
mod document;
mod info;
mod parameter;
mod request_body;
mod source_description;
mod step;
mod workflow;

pub use common::{AnyValue, Extensions, JsonSchema, RuntimeExpression};
pub use criterion::{Criterion, CriterionType};
pub use document::ArazzoDocument;
pub use info::Info;
pub use parameter::{Parameter, ParameterLocation};
pub use request_body::RequestBody;
pub use source_description::{SourceDescription, SourceDescriptionType};
pub use step::Step;
pub use workflow::Workflow;
