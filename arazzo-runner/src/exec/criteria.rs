use arazzo_runner_core::types::{Criterion, CriterionType};
use regex::Regex;
use serde_json::Value as JsonValue;
use serde_json_path::JsonPath;

use crate::eval::{eval_expr, ExprContext, ResponseView};

/// All criteria must hold for the step to succeed. An empty list falls back
/// to the 2xx status check.
pub fn evaluate_success(criteria: &[Criterion], resp: &ResponseView<'_>) -> bool {
    if criteria.is_empty() {
        return (200..300).contains(&resp.status);
    }
    criteria.iter().all(|c| evaluate_criterion(c, resp))
}

fn evaluate_criterion(c: &Criterion, resp: &ResponseView<'_>) -> bool {
    match c.r#type {
        None | Some(CriterionType::Simple) => evaluate_simple(c, resp),
        Some(CriterionType::Jsonpath) => evaluate_jsonpath(c, resp),
        Some(CriterionType::Regex) => evaluate_regex(c, resp),
    }
}

fn evaluate_simple(c: &Criterion, resp: &ResponseView<'_>) -> bool {
    let cond = c.condition.trim();

    // Parse as: <expr> <op> <literal>
    let ops = ["==", "!=", "<=", ">=", "<", ">"];
    for op in ops {
        if let Some((lhs, rhs)) = cond.split_once(op) {
            let lhs_val = resolve_response_expr(lhs.trim(), resp);
            let rhs_val = parse_literal(rhs.trim());
            return compare_values(&lhs_val, &rhs_val, op);
        }
    }

    false
}

fn evaluate_jsonpath(c: &Criterion, resp: &ResponseView<'_>) -> bool {
    let context_expr = match &c.context {
        Some(ctx) => ctx.as_str(),
        None => return false,
    };

    let context_json = resolve_response_expr(context_expr, resp);
    if context_json.is_null() {
        return false;
    }

    let condition = c.condition.trim();

    // Filter expressions $[?...] need an array target. Wrap objects so
    // filters over a single response object work as expected.
    let query_target = if condition.contains("[?") && !context_json.is_array() {
        JsonValue::Array(vec![context_json.clone()])
    } else {
        context_json.clone()
    };

    // Split on == or != only when they are not inside a filter [?...].
    let is_filter = condition.starts_with("$[?");
    if !is_filter {
        let ops = ["==", "!="];
        for op in ops {
            if let Some((path, expected)) = condition.split_once(op) {
                let jsonpath = match JsonPath::parse(path.trim()) {
                    Ok(p) => p,
                    Err(_) => return false,
                };

                let nodes: Vec<_> = jsonpath.query(&query_target).all();
                if nodes.is_empty() {
                    return false;
                }

                let expected_val = parse_literal(expected.trim());
                return compare_values(nodes[0], &expected_val, op);
            }
        }
    }

    // Filter expression or existence check
    let jsonpath = match JsonPath::parse(condition) {
        Ok(p) => p,
        Err(_) => return false,
    };
    !jsonpath.query(&query_target).all().is_empty()
}

fn evaluate_regex(c: &Criterion, resp: &ResponseView<'_>) -> bool {
    let context_expr = match &c.context {
        Some(ctx) => ctx.as_str(),
        None => return false,
    };

    let context_json = resolve_response_expr(context_expr, resp);
    let context_str = match context_json {
        JsonValue::String(s) => s,
        v => v.to_string(),
    };

    let pattern = c.condition.trim();
    Regex::new(pattern).map(|re| re.is_match(&context_str)).unwrap_or(false)
}

/// Resolve a runtime expression against the current response only. Criteria
/// see `$statusCode`, `$response.*`, `$url` and `$method`; anything that
/// cannot be resolved collapses to null so the comparison simply fails.
fn resolve_response_expr(expr: &str, resp: &ResponseView<'_>) -> JsonValue {
    let inputs = JsonValue::Null;
    let ctx = ExprContext { inputs: &inputs, steps: &[], response: Some(resp.clone()) };
    eval_expr(expr, &ctx).unwrap_or(JsonValue::Null)
}

fn parse_literal(s: &str) -> JsonValue {
    let s = s.trim();

    // Try JSON first
    if let Ok(v) = serde_json::from_str::<JsonValue>(s) {
        return v;
    }

    // Quoted string
    if (s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')) {
        return JsonValue::String(s[1..s.len() - 1].to_string());
    }

    if let Ok(n) = s.parse::<i64>() {
        return JsonValue::Number(n.into());
    }
    if let Ok(n) = s.parse::<f64>() {
        if let Some(num) = serde_json::Number::from_f64(n) {
            return JsonValue::Number(num);
        }
    }

    JsonValue::String(s.to_string())
}

fn compare_values(actual: &JsonValue, expected: &JsonValue, op: &str) -> bool {
    match op {
        "==" => json_eq(actual, expected),
        "!=" => !json_eq(actual, expected),
        "<" => json_cmp(actual, expected).map(|o| o.is_lt()).unwrap_or(false),
        ">" => json_cmp(actual, expected).map(|o| o.is_gt()).unwrap_or(false),
        "<=" => json_cmp(actual, expected).map(|o| o.is_le()).unwrap_or(false),
        ">=" => json_cmp(actual, expected).map(|o| o.is_ge()).unwrap_or(false),
        _ => false,
    }
}

fn json_eq(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(a), JsonValue::Number(b)) => a.as_f64() == b.as_f64(),
        (JsonValue::Array(a), JsonValue::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| json_eq(x, y))
        }
        (JsonValue::Object(a), JsonValue::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(k, v)| b.get(k).map(|bv| json_eq(v, bv)).unwrap_or(false))
        }
        _ => a == b,
    }
}

fn json_cmp(a: &JsonValue, b: &JsonValue) -> Option<std::cmp::Ordering> {
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn make_resp(status: u16, body: &str) -> (BTreeMap<String, String>, Option<JsonValue>, u16) {
        (BTreeMap::new(), serde_json::from_str(body).ok(), status)
    }

    fn view<'a>(
        headers: &'a BTreeMap<String, String>,
        body: &'a Option<JsonValue>,
        status: u16,
    ) -> ResponseView<'a> {
        ResponseView {
            status,
            url: "https://example.test/",
            method: "get",
            headers,
            body_json: body.as_ref(),
        }
    }

    fn criterion(
        context: Option<&str>,
        condition: &str,
        r#type: Option<CriterionType>,
    ) -> Criterion {
        Criterion {
            context: context.map(str::to_string),
            condition: condition.to_string(),
            r#type,
            extensions: Default::default(),
        }
    }

    #[test]
    fn simple_status_code() {
        let (h, b, s) = make_resp(200, "{}");
        let resp = view(&h, &b, s);
        let c = criterion(None, "$statusCode == 200", None);
        assert!(evaluate_criterion(&c, &resp));
        let c = criterion(None, "$statusCode == 404", None);
        assert!(!evaluate_criterion(&c, &resp));
    }

    #[test]
    fn simple_body_field() {
        let (h, b, s) = make_resp(200, r#"{"name": "Antonette"}"#);
        let resp = view(&h, &b, s);
        let c = criterion(None, r#"$response.body#/name == "Antonette""#, None);
        assert!(evaluate_criterion(&c, &resp));
    }

    #[test]
    fn simple_numeric_ordering() {
        let (h, b, s) = make_resp(201, "{}");
        let resp = view(&h, &b, s);
        assert!(evaluate_criterion(&criterion(None, "$statusCode < 300", None), &resp));
        assert!(evaluate_criterion(&criterion(None, "$statusCode >= 201", None), &resp));
        assert!(!evaluate_criterion(&criterion(None, "$statusCode < 200", None), &resp));
    }

    #[test]
    fn jsonpath_comparison() {
        let (h, b, s) = make_resp(200, r#"{"authenticated": true}"#);
        let resp = view(&h, &b, s);
        let c = criterion(
            Some("$response.body"),
            "$.authenticated == true",
            Some(CriterionType::Jsonpath),
        );
        assert!(evaluate_criterion(&c, &resp));
    }

    #[test]
    fn jsonpath_filter_existence() {
        let (h, b, s) = make_resp(200, r#"{"origin": "1.2.3.4"}"#);
        let resp = view(&h, &b, s);
        let c = criterion(Some("$response.body"), "$[?(@.origin)]", Some(CriterionType::Jsonpath));
        assert!(evaluate_criterion(&c, &resp));

        let (h, b, s) = make_resp(200, r#"{"other": "value"}"#);
        let resp = view(&h, &b, s);
        assert!(!evaluate_criterion(&c, &resp));
    }

    #[test]
    fn regex_on_body_field() {
        let (h, b, s) = make_resp(200, r#"{"title": "hello world"}"#);
        let resp = view(&h, &b, s);
        let c = criterion(Some("$response.body#/title"), "^hello.*", Some(CriterionType::Regex));
        assert!(evaluate_criterion(&c, &resp));
    }

    #[test]
    fn empty_criteria_falls_back_to_2xx() {
        let (h, b, s) = make_resp(204, "null");
        let resp = view(&h, &b, s);
        assert!(evaluate_success(&[], &resp));
        let (h, b, s) = make_resp(500, "null");
        let resp = view(&h, &b, s);
        assert!(!evaluate_success(&[], &resp));
    }
}
