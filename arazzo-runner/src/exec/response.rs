use arazzo_runner_core::types::Step;
use serde_json::Value as JsonValue;

use crate::eval::{eval_value, EvalError, ExprContext, ResponseView};
use crate::exec::criteria;
use crate::exec::http::HttpResponseParts;

pub fn parse_body_json(resp: &HttpResponseParts) -> Option<JsonValue> {
    let s = std::str::from_utf8(&resp.body).ok()?;
    serde_json::from_str(s).ok()
}

pub fn evaluate_success(step: &Step, resp: &ResponseView<'_>) -> bool {
    let Some(ref crit) = step.success_criteria else {
        return (200..300).contains(&resp.status);
    };
    criteria::evaluate_success(crit, resp)
}

/// Evaluate the step's declared output expressions against the response
/// context. Any unresolvable expression (missing field, index out of bounds)
/// fails the whole step rather than silently producing nulls.
pub fn compute_outputs(
    step: &Step,
    ctx: &ExprContext<'_>,
) -> Result<serde_json::Map<String, JsonValue>, (String, EvalError)> {
    let mut map = serde_json::Map::new();
    if let Some(outputs) = &step.outputs {
        for (name, expr) in outputs {
            let v = eval_value(&JsonValue::String(expr.clone()), ctx)
                .map_err(|e| (name.clone(), e))?;
            map.insert(name.clone(), v);
        }
    }
    Ok(map)
}
