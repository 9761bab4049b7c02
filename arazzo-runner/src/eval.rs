use std::collections::BTreeMap;

use arazzo_runner_core::expressions::{
    parse_runtime_expr, parse_template, NamePath, PathSegment, RuntimeExpr, RuntimeExprError,
    Segment, Source, TemplateError,
};
use serde_json::Value as JsonValue;

/// Everything a runtime expression can see at one point in an execution:
/// the merged workflow inputs, the outputs of previously completed steps in
/// execution order, and (inside a step) the current operation response.
#[derive(Clone)]
pub struct ExprContext<'a> {
    pub inputs: &'a JsonValue,
    pub steps: &'a [(String, JsonValue)],
    pub response: Option<ResponseView<'a>>,
}

#[derive(Clone)]
pub struct ResponseView<'a> {
    pub status: u16,
    pub url: &'a str,
    pub method: &'a str,
    pub headers: &'a BTreeMap<String, String>,
    pub body_json: Option<&'a JsonValue>,
}

/// Why an expression could not be resolved against the current context.
/// These surface as failed step results, never as panics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("invalid runtime expression: {0}")]
    Syntax(#[from] RuntimeExprError),
    #[error("invalid template: {0}")]
    Template(#[from] TemplateError),
    #[error("step '{0}' has not executed yet")]
    StepNotExecuted(String),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("array index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("cannot index into non-array value with [{0}]")]
    IndexIntoNonArray(usize),
    #[error("no response in scope for {0}")]
    NoResponse(String),
    #[error("unsupported expression in this position: {0}")]
    Unsupported(String),
}

/// Resolve a value that may be a literal, a `$...` expression, or contain
/// embedded `{ $... }` templates. Pure and deterministic for a given context.
pub fn eval_value(value: &JsonValue, ctx: &ExprContext<'_>) -> Result<JsonValue, EvalError> {
    match value {
        JsonValue::Null | JsonValue::Bool(_) | JsonValue::Number(_) => Ok(value.clone()),
        JsonValue::String(s) => eval_string(s, ctx),
        JsonValue::Array(arr) => {
            let mut out = Vec::with_capacity(arr.len());
            for v in arr {
                out.push(eval_value(v, ctx)?);
            }
            Ok(JsonValue::Array(out))
        }
        JsonValue::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k.clone(), eval_value(v, ctx)?);
            }
            Ok(JsonValue::Object(out))
        }
    }
}

fn eval_string(s: &str, ctx: &ExprContext<'_>) -> Result<JsonValue, EvalError> {
    let trimmed = s.trim();
    if trimmed.starts_with('$') {
        return eval_expr(trimmed, ctx);
    }

    let tpl = parse_template(s)?;
    if tpl.segments.len() == 1 {
        if let Segment::Literal(lit) = &tpl.segments[0] {
            return Ok(JsonValue::String(lit.clone()));
        }
    }

    let mut out = String::new();
    for seg in tpl.segments {
        match seg {
            Segment::Literal(l) => out.push_str(&l),
            Segment::Expr(e) => {
                let v = eval_expr(&e, ctx)?;
                match v {
                    JsonValue::String(s) => out.push_str(&s),
                    JsonValue::Number(n) => out.push_str(&n.to_string()),
                    JsonValue::Bool(b) => out.push_str(if b { "true" } else { "false" }),
                    JsonValue::Null => {}
                    other => out.push_str(&other.to_string()),
                }
            }
        }
    }
    Ok(JsonValue::String(out))
}

pub fn eval_expr(expr: &str, ctx: &ExprContext<'_>) -> Result<JsonValue, EvalError> {
    let parsed = parse_runtime_expr(expr)?;
    match parsed {
        RuntimeExpr::Inputs(np) => {
            let root = ctx
                .inputs
                .get(&np.root)
                .ok_or_else(|| EvalError::MissingInput(np.root.clone()))?;
            let v = walk_segments(root, &np.segments)?;
            apply_pointer(v, &np)
        }
        RuntimeExpr::Steps(np) => eval_steps(&np, ctx),
        RuntimeExpr::StatusCode => {
            let resp = require_response(ctx, "$statusCode")?;
            Ok(JsonValue::Number(resp.status.into()))
        }
        RuntimeExpr::Url => {
            let resp = require_response(ctx, "$url")?;
            Ok(JsonValue::String(resp.url.to_string()))
        }
        RuntimeExpr::Method => {
            let resp = require_response(ctx, "$method")?;
            Ok(JsonValue::String(resp.method.to_string()))
        }
        RuntimeExpr::Response(source) => eval_response_source(&source, ctx),
        RuntimeExpr::SourceDescriptions(_) => Err(EvalError::Unsupported(expr.to_string())),
    }
}

fn eval_steps(np: &NamePath, ctx: &ExprContext<'_>) -> Result<JsonValue, EvalError> {
    // Only `$steps.<stepId>.outputs.<path>` reads are meaningful at runtime.
    let Some(PathSegment::Key(first)) = np.segments.first() else {
        return Err(EvalError::Unsupported(format!("$steps.{}", np.root)));
    };
    if first != "outputs" {
        return Err(EvalError::Unsupported(format!(
            "$steps.{}.{first} (only outputs are addressable)",
            np.root
        )));
    }

    let outputs = ctx
        .steps
        .iter()
        .find(|(step_id, _)| step_id == &np.root)
        .map(|(_, outputs)| outputs)
        .ok_or_else(|| EvalError::StepNotExecuted(np.root.clone()))?;

    let v = walk_segments(outputs, &np.segments[1..])?;
    apply_pointer(v, np)
}

fn eval_response_source(source: &Source, ctx: &ExprContext<'_>) -> Result<JsonValue, EvalError> {
    let resp = require_response(ctx, "$response")?;
    match source {
        Source::Header(name) => {
            let v = resp
                .headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
                .unwrap_or_default();
            Ok(JsonValue::String(v))
        }
        Source::Body { pointer } => {
            let body = resp
                .body_json
                .ok_or_else(|| EvalError::MissingField("response body is not JSON".to_string()))?;
            match pointer {
                Some(ptr) => body
                    .pointer(ptr.as_str())
                    .cloned()
                    .ok_or_else(|| EvalError::MissingField(format!("$response.body#{}", ptr.as_str()))),
                None => Ok(body.clone()),
            }
        }
        Source::Query(name) | Source::Path(name) => Err(EvalError::Unsupported(format!(
            "$response.{name} (request-side sources are not addressable from a response)"
        ))),
    }
}

fn require_response<'a, 'v>(
    ctx: &'a ExprContext<'v>,
    what: &str,
) -> Result<&'a ResponseView<'v>, EvalError> {
    ctx.response
        .as_ref()
        .ok_or_else(|| EvalError::NoResponse(what.to_string()))
}

fn walk_segments<'v>(
    mut cur: &'v JsonValue,
    segments: &[PathSegment],
) -> Result<&'v JsonValue, EvalError> {
    for seg in segments {
        match seg {
            PathSegment::Key(key) => {
                cur = cur
                    .get(key)
                    .ok_or_else(|| EvalError::MissingField(key.clone()))?;
            }
            PathSegment::Index(idx) => {
                let arr = cur
                    .as_array()
                    .ok_or(EvalError::IndexIntoNonArray(*idx))?;
                cur = arr.get(*idx).ok_or(EvalError::IndexOutOfBounds {
                    index: *idx,
                    len: arr.len(),
                })?;
            }
        }
    }
    Ok(cur)
}

fn apply_pointer(v: &JsonValue, np: &NamePath) -> Result<JsonValue, EvalError> {
    match &np.pointer {
        Some(ptr) => v
            .pointer(ptr.as_str())
            .cloned()
            .ok_or_else(|| EvalError::MissingField(format!("#{}", ptr.as_str()))),
        None => Ok(v.clone()),
    }
}
