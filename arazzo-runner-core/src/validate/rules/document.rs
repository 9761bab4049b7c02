use std::collections::HashSet;

use crate::types::ArazzoDocument;
use crate::validate::rules::workflow;
use crate::validate::validator::{Validator, ID_RE};

pub(crate) fn validate_document(v: &mut Validator, doc: &ArazzoDocument) {
    v.validate_extensions("$", &doc.extensions);
    v.validate_spec_version("$.arazzo", &doc.arazzo);

    if doc.info.title.trim().is_empty() {
        v.push("$.info.title", "must not be empty");
    }
    if doc.info.version.trim().is_empty() {
        v.push("$.info.version", "must not be empty");
    }
    v.validate_extensions("$.info", &doc.info.extensions);

    if doc.source_descriptions.is_empty() {
        v.push("$.sourceDescriptions", "must have at least one entry");
    }

    let mut source_names = HashSet::<String>::new();
    for (idx, src) in doc.source_descriptions.iter().enumerate() {
        let path = format!("$.sourceDescriptions[{idx}]");
        v.validate_extensions(&path, &src.extensions);

        if !ID_RE.is_match(&src.name) {
            v.push(format!("{path}.name"), "must match regex [A-Za-z0-9_\\-]+");
        }
        if !source_names.insert(src.name.clone()) {
            v.push(format!("{path}.name"), "must be unique");
        }
        if src.url.trim().is_empty() {
            v.push(format!("{path}.url"), "must not be empty");
        }
    }

    if doc.workflows.is_empty() {
        v.push("$.workflows", "must have at least one entry");
    }

    let mut workflow_ids = HashSet::<String>::new();
    for (idx, wf) in doc.workflows.iter().enumerate() {
        let path = format!("$.workflows[{idx}]");
        v.validate_extensions(&path, &wf.extensions);

        if !ID_RE.is_match(&wf.workflow_id) {
            v.push(
                format!("{path}.workflowId"),
                "must match regex [A-Za-z0-9_\\-]+",
            );
        }
        if !workflow_ids.insert(wf.workflow_id.clone()) {
            v.push(format!("{path}.workflowId"), "must be unique");
        }

        workflow::validate_workflow(v, wf, &path);
    }
}
