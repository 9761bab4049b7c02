use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    InProgress,
    Complete,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExecutionStatus::InProgress)
    }
}

/// What one advancement call observed. Terminal variants are sticky: once
/// an execution finishes, further advancement calls replay the same outcome
/// without performing any work.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// A step ran and its outputs were recorded.
    StepComplete { step_id: String },
    /// A step failed but the execution keeps advancing
    /// (`FailureMode::Continue` only).
    StepFailed { step_id: String, error: String },
    /// The last step completed; these are the workflow-level outputs.
    WorkflowComplete { outputs: JsonValue },
    /// The execution is finished and unsuccessful.
    Failed { error: String },
}

/// Terminal summary of an execution, as returned by `execute_workflow`.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub execution_id: Uuid,
    pub workflow_id: String,
    pub status: ExecutionStatus,
    pub outputs: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Point-in-time view of one execution, safe to hand to callers.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionSnapshot {
    pub execution_id: Uuid,
    pub workflow_id: String,
    pub status: ExecutionStatus,
    /// Index of the next step to run, in the workflow's declared order.
    pub cursor: usize,
    pub completed_steps: Vec<String>,
    pub failed_steps: Vec<(String, String)>,
}

/// Mutable state of a single workflow execution. Step outputs are kept in
/// execution order and only ever appended; the cursor only moves forward.
#[derive(Debug)]
pub struct ExecutionState {
    pub execution_id: Uuid,
    pub workflow_id: String,
    pub inputs: JsonValue,
    pub cursor: usize,
    pub step_outputs: Vec<(String, JsonValue)>,
    pub failed_steps: Vec<(String, String)>,
    pub status: ExecutionStatus,
    terminal: Option<StepOutcome>,
}

impl ExecutionState {
    pub fn new(execution_id: Uuid, workflow_id: String, inputs: JsonValue) -> Self {
        Self {
            execution_id,
            workflow_id,
            inputs,
            cursor: 0,
            step_outputs: Vec::new(),
            failed_steps: Vec::new(),
            status: ExecutionStatus::InProgress,
            terminal: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The outcome advancement calls replay once the execution is terminal.
    pub fn terminal_outcome(&self) -> Option<StepOutcome> {
        self.terminal.clone()
    }

    pub fn record_step(&mut self, step_id: String, outputs: serde_json::Map<String, JsonValue>) {
        self.step_outputs.push((step_id, JsonValue::Object(outputs)));
        self.cursor += 1;
    }

    /// Record a failed step without outputs; later expressions that reference
    /// it will fail to resolve. Continue-mode advancement only.
    pub fn record_step_failure(&mut self, step_id: String, error: String) {
        self.failed_steps.push((step_id, error));
        self.cursor += 1;
    }

    pub fn complete(&mut self, outputs: JsonValue) {
        self.status = if self.failed_steps.is_empty() {
            ExecutionStatus::Complete
        } else {
            ExecutionStatus::Failed
        };
        self.terminal = Some(match self.status {
            ExecutionStatus::Complete => StepOutcome::WorkflowComplete { outputs },
            _ => StepOutcome::Failed {
                error: format!(
                    "{} step(s) failed: {}",
                    self.failed_steps.len(),
                    self.failed_steps
                        .iter()
                        .map(|(id, _)| id.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            },
        });
    }

    pub fn fail(&mut self, error: String) {
        self.status = ExecutionStatus::Failed;
        self.terminal = Some(StepOutcome::Failed { error });
    }

    pub fn cancel(&mut self) {
        if !self.is_terminal() {
            self.status = ExecutionStatus::Cancelled;
        }
    }

    pub fn snapshot(&self) -> ExecutionSnapshot {
        ExecutionSnapshot {
            execution_id: self.execution_id,
            workflow_id: self.workflow_id.clone(),
            status: self.status,
            cursor: self.cursor,
            completed_steps: self.step_outputs.iter().map(|(id, _)| id.clone()).collect(),
            failed_steps: self.failed_steps.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_outputs_keep_execution_order() {
        let mut st = ExecutionState::new(Uuid::new_v4(), "wf".into(), JsonValue::Null);
        st.record_step("a".into(), serde_json::Map::new());
        st.record_step("b".into(), serde_json::Map::new());
        st.record_step("c".into(), serde_json::Map::new());
        let ids: Vec<_> = st.step_outputs.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(st.cursor, 3);
    }

    #[test]
    fn completion_with_failed_steps_is_failed() {
        let mut st = ExecutionState::new(Uuid::new_v4(), "wf".into(), JsonValue::Null);
        st.record_step("a".into(), serde_json::Map::new());
        st.record_step_failure("b".into(), "boom".into());
        st.complete(JsonValue::Null);
        assert_eq!(st.status, ExecutionStatus::Failed);
        assert!(matches!(st.terminal_outcome(), Some(StepOutcome::Failed { .. })));
    }

    #[test]
    fn cancel_does_not_override_terminal_status() {
        let mut st = ExecutionState::new(Uuid::new_v4(), "wf".into(), JsonValue::Null);
        st.complete(JsonValue::Null);
        st.cancel();
        assert_eq!(st.status, ExecutionStatus::Complete);
    }
}
