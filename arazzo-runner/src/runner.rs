use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use arazzo_runner_core::types::{ArazzoDocument, SourceDescriptionType, Workflow};
use arazzo_runner_core::{parse_document_str, validate_document, DocumentFormat};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::compile::{compile_document, CompiledOperations};
use crate::config::{FailureMode, RunnerConfig};
use crate::error::RunnerError;
use crate::eval::{eval_expr, ExprContext};
use crate::events::{Event, EventSink, NoOpEventSink};
use crate::exec::{execute_step, HttpClient, ReqwestHttpClient};
use crate::sources::{load_source, SourceError, SourceRegistry};
use crate::state::{
    ExecutionRegistry, ExecutionSnapshot, ExecutionState, ExecutionStatus, StepOutcome,
    WorkflowResult,
};

/// Executes the workflows of one Arazzo document against their registered
/// API descriptions.
///
/// All step operation references are resolved at construction, so a runner
/// that builds successfully cannot hit an unknown source or operation at
/// execution time. Execution state lives in an in-memory registry keyed by
/// execution id; a single runner drives any number of concurrent executions.
pub struct Runner {
    document: ArazzoDocument,
    compiled: CompiledOperations,
    config: RunnerConfig,
    http: Arc<dyn HttpClient>,
    events: Arc<dyn EventSink>,
    executions: Arc<ExecutionRegistry>,
}

impl Runner {
    /// Build a runner from a parsed document and its already-fetched API
    /// descriptions, keyed by source description name.
    pub fn new(
        document: ArazzoDocument,
        sources_by_alias: BTreeMap<String, JsonValue>,
    ) -> Result<Self, RunnerError> {
        validate_document(&document)?;
        let sources = SourceRegistry::from_docs(sources_by_alias);
        let compiled = compile_document(&document, &sources)?;
        Ok(Self {
            document,
            compiled,
            config: RunnerConfig::default(),
            http: Arc::new(ReqwestHttpClient::default()),
            events: Arc::new(NoOpEventSink),
            executions: Arc::new(ExecutionRegistry::new()),
        })
    }

    /// Build a runner from an Arazzo document on disk, fetching every
    /// `openapi` source description it names. Relative source URLs are
    /// resolved against the document's directory.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RunnerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let parsed = parse_document_str(&text, DocumentFormat::Auto)?;
        let document = parsed.document;
        validate_document(&document)?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let client = reqwest::Client::new();
        let mut docs = BTreeMap::new();
        for sd in &document.source_descriptions {
            if sd.source_type == Some(SourceDescriptionType::Arazzo) {
                continue;
            }
            let location = resolve_source_location(base_dir, &sd.url);
            let raw = load_source(&client, &location).await.map_err(|message| {
                SourceError::Load {
                    name: sd.name.clone(),
                    url: location.clone(),
                    message,
                }
            })?;
            docs.insert(sd.name.clone(), raw);
        }
        Self::new(document, docs)
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = http;
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Share an execution registry between runners, or hand one in for
    /// inspection from outside.
    pub fn with_execution_registry(mut self, executions: Arc<ExecutionRegistry>) -> Self {
        self.executions = executions;
        self
    }

    pub fn document(&self) -> &ArazzoDocument {
        &self.document
    }

    pub fn workflow_ids(&self) -> impl Iterator<Item = &str> {
        self.document.workflows.iter().map(|w| w.workflow_id.as_str())
    }

    /// Begin a new execution of the named workflow. Inputs the caller omits
    /// are seeded from the `default` values in the workflow's inputs schema.
    /// No step runs until the execution is advanced.
    pub async fn start_workflow(
        &self,
        workflow_id: &str,
        inputs: Option<JsonValue>,
    ) -> Result<Uuid, RunnerError> {
        let wf = self
            .document
            .workflow(workflow_id)
            .ok_or_else(|| RunnerError::UnknownWorkflow(workflow_id.to_string()))?;

        let merged = merge_inputs(wf, inputs);
        let execution_id = Uuid::new_v4();
        let state = ExecutionState::new(execution_id, wf.workflow_id.clone(), merged);
        self.executions.insert(state).await;

        self.events
            .emit(Event::WorkflowStarted {
                execution_id,
                workflow_id: wf.workflow_id.clone(),
            })
            .await;
        Ok(execution_id)
    }

    /// Advance the execution by exactly one step, in the workflow's declared
    /// order. Once all steps have run, one further call resolves the
    /// workflow-level outputs and reports the terminal outcome; calls after
    /// that replay the terminal outcome without doing any work.
    pub async fn execute_next_step(&self, execution_id: Uuid) -> Result<StepOutcome, RunnerError> {
        let entry = self
            .executions
            .get(execution_id)
            .await
            .ok_or(RunnerError::UnknownExecution(execution_id))?;
        let mut st = entry.lock().await;

        if st.status == ExecutionStatus::Cancelled {
            return Err(RunnerError::Cancelled(execution_id));
        }
        if let Some(outcome) = st.terminal_outcome() {
            return Ok(outcome);
        }

        let wf = self
            .document
            .workflow(&st.workflow_id)
            .ok_or_else(|| RunnerError::UnknownWorkflow(st.workflow_id.clone()))?;

        if st.cursor >= wf.steps.len() {
            return Ok(self.finalize(wf, &mut st).await);
        }

        let step = &wf.steps[st.cursor];
        let step_id = step.step_id.clone();
        self.events
            .emit(Event::StepStarted {
                execution_id,
                step_id: step_id.clone(),
            })
            .await;

        let Some(op) = self.compiled.get(&st.workflow_id, &step_id) else {
            // Unreachable after a successful compile; fail the execution
            // rather than panic if it ever happens.
            let error = format!("no compiled operation for step '{step_id}'");
            st.fail(error.clone());
            self.events
                .emit(Event::WorkflowFailed {
                    execution_id,
                    workflow_id: st.workflow_id.clone(),
                    error: error.clone(),
                })
                .await;
            return Ok(StepOutcome::Failed { error });
        };

        match execute_step(step, op, &st.inputs, &st.step_outputs, &*self.http, &self.config).await
        {
            Ok(run) => {
                st.record_step(run.step_id.clone(), run.outputs);
                self.events
                    .emit(Event::StepCompleted {
                        execution_id,
                        step_id: run.step_id.clone(),
                    })
                    .await;
                Ok(StepOutcome::StepComplete { step_id: run.step_id })
            }
            Err(failure) => {
                let error = format!("step '{step_id}' failed: {failure}");
                self.events
                    .emit(Event::StepFailed {
                        execution_id,
                        step_id: step_id.clone(),
                        error: error.clone(),
                    })
                    .await;
                match self.config.failure_mode {
                    FailureMode::Halt => {
                        st.fail(error.clone());
                        self.events
                            .emit(Event::WorkflowFailed {
                                execution_id,
                                workflow_id: st.workflow_id.clone(),
                                error: error.clone(),
                            })
                            .await;
                        Ok(StepOutcome::Failed { error })
                    }
                    FailureMode::Continue => {
                        st.record_step_failure(step_id.clone(), error.clone());
                        Ok(StepOutcome::StepFailed { step_id, error })
                    }
                }
            }
        }
    }

    /// Start the workflow and advance it to a terminal state.
    pub async fn execute_workflow(
        &self,
        workflow_id: &str,
        inputs: Option<JsonValue>,
    ) -> Result<WorkflowResult, RunnerError> {
        let execution_id = self.start_workflow(workflow_id, inputs).await?;
        loop {
            match self.execute_next_step(execution_id).await? {
                StepOutcome::StepComplete { .. } | StepOutcome::StepFailed { .. } => continue,
                StepOutcome::WorkflowComplete { outputs } => {
                    return Ok(WorkflowResult {
                        execution_id,
                        workflow_id: workflow_id.to_string(),
                        status: ExecutionStatus::Complete,
                        outputs,
                        error: None,
                    });
                }
                StepOutcome::Failed { error } => {
                    return Ok(WorkflowResult {
                        execution_id,
                        workflow_id: workflow_id.to_string(),
                        status: ExecutionStatus::Failed,
                        outputs: JsonValue::Null,
                        error: Some(error),
                    });
                }
            }
        }
    }

    /// Whether another `execute_next_step` call would perform work.
    pub async fn is_advanceable(&self, execution_id: Uuid) -> Result<bool, RunnerError> {
        let entry = self
            .executions
            .get(execution_id)
            .await
            .ok_or(RunnerError::UnknownExecution(execution_id))?;
        let st = entry.lock().await;
        Ok(!st.is_terminal())
    }

    /// Freeze an in-progress execution. Terminal executions are unaffected.
    pub async fn cancel(&self, execution_id: Uuid) -> Result<(), RunnerError> {
        let entry = self
            .executions
            .get(execution_id)
            .await
            .ok_or(RunnerError::UnknownExecution(execution_id))?;
        let mut st = entry.lock().await;
        let was_in_progress = !st.is_terminal();
        st.cancel();
        if was_in_progress {
            self.events
                .emit(Event::ExecutionCancelled { execution_id })
                .await;
        }
        Ok(())
    }

    pub async fn execution_snapshot(
        &self,
        execution_id: Uuid,
    ) -> Result<ExecutionSnapshot, RunnerError> {
        let entry = self
            .executions
            .get(execution_id)
            .await
            .ok_or(RunnerError::UnknownExecution(execution_id))?;
        let st = entry.lock().await;
        Ok(st.snapshot())
    }

    /// Discard a terminal execution's state.
    pub async fn remove_execution(&self, execution_id: Uuid) -> Result<(), RunnerError> {
        self.executions
            .remove(execution_id)
            .await
            .map(|_| ())
            .ok_or(RunnerError::UnknownExecution(execution_id))
    }

    /// Resolve workflow-level outputs and flip the execution to its terminal
    /// state. An unresolvable output expression fails the execution.
    async fn finalize(&self, wf: &Workflow, st: &mut ExecutionState) -> StepOutcome {
        let evaluated = eval_workflow_outputs(wf, st);
        let outputs = match evaluated {
            Ok(outputs) => outputs,
            Err(error) => {
                st.fail(error.clone());
                self.events
                    .emit(Event::WorkflowFailed {
                        execution_id: st.execution_id,
                        workflow_id: st.workflow_id.clone(),
                        error: error.clone(),
                    })
                    .await;
                return StepOutcome::Failed { error };
            }
        };

        st.complete(JsonValue::Object(outputs));
        let outcome = match st.terminal_outcome() {
            Some(o) => o,
            None => StepOutcome::Failed {
                error: "execution finished without a terminal outcome".to_string(),
            },
        };
        match &outcome {
            StepOutcome::WorkflowComplete { .. } => {
                self.events
                    .emit(Event::WorkflowCompleted {
                        execution_id: st.execution_id,
                        workflow_id: st.workflow_id.clone(),
                    })
                    .await;
            }
            other => {
                let error = match other {
                    StepOutcome::Failed { error } => error.clone(),
                    _ => String::new(),
                };
                self.events
                    .emit(Event::WorkflowFailed {
                        execution_id: st.execution_id,
                        workflow_id: st.workflow_id.clone(),
                        error,
                    })
                    .await;
            }
        }
        outcome
    }
}

fn eval_workflow_outputs(
    wf: &Workflow,
    st: &ExecutionState,
) -> Result<serde_json::Map<String, JsonValue>, String> {
    let ctx = ExprContext {
        inputs: &st.inputs,
        steps: &st.step_outputs,
        response: None,
    };
    let mut outputs = serde_json::Map::new();
    if let Some(decls) = &wf.outputs {
        for (name, expr) in decls {
            let v = eval_expr(expr, &ctx)
                .map_err(|e| format!("workflow output '{name}' could not be resolved: {e}"))?;
            outputs.insert(name.clone(), v);
        }
    }
    Ok(outputs)
}

/// Caller inputs merged over the workflow's schema defaults. Explicit values
/// win; non-object inputs are used as-is.
fn merge_inputs(wf: &Workflow, inputs: Option<JsonValue>) -> JsonValue {
    let defaults = wf.input_defaults();
    match inputs {
        Some(JsonValue::Object(given)) => {
            let mut merged = serde_json::Map::new();
            for (k, v) in defaults {
                merged.insert(k, v);
            }
            for (k, v) in given {
                merged.insert(k, v);
            }
            JsonValue::Object(merged)
        }
        Some(other) => other,
        None => {
            let mut merged = serde_json::Map::new();
            for (k, v) in defaults {
                merged.insert(k, v);
            }
            JsonValue::Object(merged)
        }
    }
}

fn resolve_source_location(base_dir: &Path, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") || Path::new(url).is_absolute() {
        url.to_string()
    } else {
        base_dir.join(url).to_string_lossy().into_owned()
    }
}
