use crate::types::Step;
use crate::validate::rules::{
    common::{validate_map_keys, validate_runtime_expr, validate_template_string,
        validate_value_exprs},
    criteria,
};
use crate::validate::validator::Validator;

pub(crate) fn validate_step(v: &mut Validator, step: &Step, path: &str) {
    let op_fields = [step.operation_id.is_some(), step.operation_path.is_some()]
        .into_iter()
        .filter(|present| *present)
        .count();

    if op_fields != 1 {
        v.push(
            path,
            "exactly one of operationId, operationPath must be provided",
        );
    }

    if let Some(operation_id) = &step.operation_id {
        // Qualified references ($sourceDescriptions.<name>.<opId>) must parse.
        if operation_id.trim().starts_with('$') {
            validate_runtime_expr(v, &format!("{path}.operationId"), operation_id.trim());
        }
    }

    if let Some(operation_path) = &step.operation_path {
        let op_path = format!("{path}.operationPath");
        validate_template_string(v, &op_path, operation_path);
        if !operation_path.contains("$sourceDescriptions.") {
            v.push(
                op_path,
                "must use a $sourceDescriptions.* runtime expression to identify the source description document",
            );
        }
    }

    if let Some(parameters) = &step.parameters {
        for (pidx, p) in parameters.iter().enumerate() {
            let ppath = format!("{path}.parameters[{pidx}]");
            v.validate_extensions(&ppath, &p.extensions);
            if p.name.trim().is_empty() {
                v.push(format!("{ppath}.name"), "must not be empty");
            }
            validate_value_exprs(v, &format!("{ppath}.value"), &p.value);
        }
    }

    if let Some(rb) = &step.request_body {
        let rb_path = format!("{path}.requestBody");
        v.validate_extensions(&rb_path, &rb.extensions);
        if let Some(payload) = &rb.payload {
            validate_value_exprs(v, &format!("{rb_path}.payload"), payload);
        }
    }

    if let Some(outputs) = &step.outputs {
        validate_map_keys(v, &format!("{path}.outputs"), outputs.keys());
        for (k, expr) in outputs {
            validate_runtime_expr(v, &format!("{path}.outputs.{k}"), expr);
        }
    }

    if let Some(success_criteria) = &step.success_criteria {
        criteria::validate_criteria_list(v, &format!("{path}.successCriteria"), success_criteria);
    }
}
