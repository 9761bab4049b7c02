use crate::types::{Criterion, CriterionType};
use crate::validate::rules::common::validate_runtime_expr;
use crate::validate::validator::Validator;

pub(crate) fn validate_criteria_list(v: &mut Validator, path: &str, criteria: &[Criterion]) {
    for (idx, c) in criteria.iter().enumerate() {
        let cpath = format!("{path}[{idx}]");
        v.validate_extensions(&cpath, &c.extensions);

        if c.condition.trim().is_empty() {
            v.push(format!("{cpath}.condition"), "must not be empty");
        }

        if let Some(context) = &c.context {
            validate_runtime_expr(v, &format!("{cpath}.context"), context);
        }

        // regex and jsonpath criteria apply their condition to a context value.
        if matches!(
            c.r#type,
            Some(CriterionType::Regex) | Some(CriterionType::Jsonpath)
        ) && c.context.is_none()
        {
            v.push(
                format!("{cpath}.context"),
                "required when type is regex or jsonpath",
            );
        }
    }
}
