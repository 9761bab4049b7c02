use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum Event {
    WorkflowStarted {
        execution_id: Uuid,
        workflow_id: String,
    },
    StepStarted {
        execution_id: Uuid,
        step_id: String,
    },
    StepCompleted {
        execution_id: Uuid,
        step_id: String,
    },
    StepFailed {
        execution_id: Uuid,
        step_id: String,
        error: String,
    },
    WorkflowCompleted {
        execution_id: Uuid,
        workflow_id: String,
    },
    WorkflowFailed {
        execution_id: Uuid,
        workflow_id: String,
        error: String,
    },
    ExecutionCancelled {
        execution_id: Uuid,
    },
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}

/// Emits one JSON line per event.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        let json = event_json(&event);
        println!("{}", serde_json::to_string(&json).unwrap_or_default());
    }
}

pub fn event_json(event: &Event) -> serde_json::Value {
    match event {
        Event::WorkflowStarted {
            execution_id,
            workflow_id,
        } => json!({
            "type": "workflow.started",
            "execution_id": execution_id.to_string(),
            "workflow_id": workflow_id,
        }),
        Event::StepStarted {
            execution_id,
            step_id,
        } => json!({
            "type": "step.started",
            "execution_id": execution_id.to_string(),
            "step_id": step_id,
        }),
        Event::StepCompleted {
            execution_id,
            step_id,
        } => json!({
            "type": "step.completed",
            "execution_id": execution_id.to_string(),
            "step_id": step_id,
        }),
        Event::StepFailed {
            execution_id,
            step_id,
            error,
        } => json!({
            "type": "step.failed",
            "execution_id": execution_id.to_string(),
            "step_id": step_id,
            "error": error,
        }),
        Event::WorkflowCompleted {
            execution_id,
            workflow_id,
        } => json!({
            "type": "workflow.completed",
            "execution_id": execution_id.to_string(),
            "workflow_id": workflow_id,
        }),
        Event::WorkflowFailed {
            execution_id,
            workflow_id,
            error,
        } => json!({
            "type": "workflow.failed",
            "execution_id": execution_id.to_string(),
            "workflow_id": workflow_id,
            "error": error,
        }),
        Event::ExecutionCancelled { execution_id } => json!({
            "type": "execution.cancelled",
            "execution_id": execution_id.to_string(),
        }),
    }
}
