use std::collections::BTreeMap;

use arazzo_runner_core::types::{ParameterLocation, Step};
use serde_json::Value as JsonValue;

use crate::eval::{eval_value, EvalError, ExprContext};
use crate::exec::http::HttpRequestParts;
use crate::sources::ResolvedOperation;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestBuildError {
    #[error("parameter '{name}': {source}")]
    Parameter {
        name: String,
        #[source]
        source: EvalError,
    },
    #[error("requestBody: {0}")]
    Body(#[from] EvalError),
    #[error("failed to serialize request body: {0}")]
    BodySerialize(String),
    #[error("missing OpenAPI server base url for source '{0}'")]
    MissingBaseUrl(String),
    #[error("invalid url: {0}")]
    Url(String),
}

/// Resolve a step's declared inputs against the execution context and build
/// the outbound request from the operation template.
pub fn build_request(
    step: &Step,
    resolved_op: &ResolvedOperation,
    ctx: &ExprContext<'_>,
) -> Result<HttpRequestParts, RequestBuildError> {
    let mut headers = BTreeMap::<String, String>::new();
    let mut query = Vec::<(String, String)>::new();
    let mut path_params = BTreeMap::<String, String>::new();

    if let Some(params) = &step.parameters {
        for p in params {
            let val = eval_value(&p.value, ctx).map_err(|source| RequestBuildError::Parameter {
                name: p.name.clone(),
                source,
            })?;
            let s = value_to_string(&val);
            match p.r#in {
                Some(ParameterLocation::Header) => {
                    headers.insert(p.name.clone(), s);
                }
                Some(ParameterLocation::Query) => {
                    query.push((p.name.clone(), s));
                }
                Some(ParameterLocation::Path) => {
                    path_params.insert(p.name.clone(), s);
                }
                Some(ParameterLocation::Cookie) => {
                    headers
                        .entry("Cookie".to_string())
                        .and_modify(|c| {
                            c.push_str("; ");
                            c.push_str(&format!("{}={}", p.name, s));
                        })
                        .or_insert_with(|| format!("{}={}", p.name, s));
                }
                // Without a location, fall back to query: the least
                // destructive placement for a resolved scalar.
                None => {
                    query.push((p.name.clone(), s));
                }
            }
        }
    }

    let body = match step.request_body.as_ref().and_then(|rb| rb.payload.as_ref()) {
        Some(payload) => {
            let v = eval_value(payload, ctx)?;
            if !headers.contains_key("Content-Type") {
                let content_type = step
                    .request_body
                    .as_ref()
                    .and_then(|rb| rb.content_type.clone())
                    .unwrap_or_else(|| "application/json".to_string());
                headers.insert("Content-Type".to_string(), content_type);
            }
            serde_json::to_vec(&v).map_err(|e| RequestBuildError::BodySerialize(e.to_string()))?
        }
        None => Vec::new(),
    };

    let url = build_url(
        &resolved_op.base_url,
        &resolved_op.path,
        &path_params,
        &query,
    )
    .map_err(|e| match e {
        UrlError::MissingBase => RequestBuildError::MissingBaseUrl(resolved_op.source_name.clone()),
        UrlError::Parse(m) => RequestBuildError::Url(m),
    })?;

    Ok(HttpRequestParts {
        method: resolved_op.method.clone(),
        url,
        headers,
        body,
    })
}

fn value_to_string(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug)]
enum UrlError {
    MissingBase,
    Parse(String),
}

fn build_url(
    base_url: &str,
    path_template: &str,
    path_params: &BTreeMap<String, String>,
    query: &[(String, String)],
) -> Result<url::Url, UrlError> {
    if base_url.is_empty() {
        return Err(UrlError::MissingBase);
    }
    let mut path = path_template.to_string();
    for (k, v) in path_params {
        path = path.replace(&format!("{{{k}}}"), &urlencoding::encode(v));
    }
    let mut url = url::Url::parse(base_url).map_err(|e| UrlError::Parse(e.to_string()))?;
    // Servers may carry a path prefix (e.g. "/v2"); keep it in front of the operation path.
    let base_path = url.path().trim_end_matches('/').to_string();
    let full_path = format!("{base_path}/{}", path.trim_start_matches('/'));
    url.set_path(&full_path);
    if !query.is_empty() {
        let mut qp = url.query_pairs_mut();
        for (k, v) in query {
            qp.append_pair(k, v);
        }
    }
    Ok(url)
}
