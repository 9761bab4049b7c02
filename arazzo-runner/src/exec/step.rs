use arazzo_runner_core::types::Step;
use serde_json::Value as JsonValue;

use crate::config::RunnerConfig;
use crate::eval::{EvalError, ExprContext, ResponseView};
use crate::exec::http::{HttpClient, HttpError};
use crate::exec::request::{build_request, RequestBuildError};
use crate::exec::response::{compute_outputs, evaluate_success, parse_body_json};
use crate::sources::ResolvedOperation;

/// A successfully completed step attempt.
#[derive(Debug, Clone)]
pub struct StepRun {
    pub step_id: String,
    pub status: u16,
    pub outputs: serde_json::Map<String, JsonValue>,
}

/// Why a step attempt failed. Every variant is structural, not a panic:
/// the caller decides whether it halts the execution or records the step
/// as failed and moves on.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StepFailure {
    #[error("could not build request: {0}")]
    Request(#[from] RequestBuildError),
    #[error("transport error: {0}")]
    Transport(#[from] HttpError),
    #[error("success criteria not satisfied (status {status})")]
    CriteriaFailed { status: u16 },
    #[error("output '{name}' could not be resolved: {source}")]
    Output {
        name: String,
        #[source]
        source: EvalError,
    },
}

/// Run one step: build the request from the pre-response context, perform
/// the single HTTP call, evaluate success criteria, then resolve the step's
/// outputs against the response. One attempt, no retries.
pub async fn execute_step(
    step: &Step,
    op: &ResolvedOperation,
    inputs: &JsonValue,
    prior_outputs: &[(String, JsonValue)],
    client: &dyn HttpClient,
    config: &RunnerConfig,
) -> Result<StepRun, StepFailure> {
    let build_ctx = ExprContext { inputs, steps: prior_outputs, response: None };
    let req = build_request(step, op, &build_ctx)?;

    let url = req.url.to_string();
    let method = req.method.clone();
    let resp = client
        .send(req, config.step_timeout, config.max_response_bytes)
        .await?;

    let body_json = parse_body_json(&resp);
    let view = ResponseView {
        status: resp.status,
        url: &url,
        method: &method,
        headers: &resp.headers,
        body_json: body_json.as_ref(),
    };

    if !evaluate_success(step, &view) {
        return Err(StepFailure::CriteriaFailed { status: resp.status });
    }

    let resp_ctx = ExprContext {
        inputs,
        steps: prior_outputs,
        response: Some(view),
    };
    let outputs = compute_outputs(step, &resp_ctx)
        .map_err(|(name, source)| StepFailure::Output { name, source })?;

    Ok(StepRun { step_id: step.step_id.clone(), status: resp.status, outputs })
}
