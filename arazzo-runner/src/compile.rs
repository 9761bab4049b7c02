use std::collections::BTreeMap;

use arazzo_runner_core::expressions::{parse_runtime_expr, PathSegment, RuntimeExpr};
use arazzo_runner_core::types::{ArazzoDocument, Step};

use crate::sources::{ResolvedOperation, SourceError, SourceRegistry};

/// Every step's operation reference resolved against the source registry,
/// keyed by (workflowId, stepId). Built once at Runner construction so that
/// unknown sources and operations fail fast instead of mid-execution.
#[derive(Debug, Default)]
pub struct CompiledOperations {
    ops: BTreeMap<(String, String), ResolvedOperation>,
}

impl CompiledOperations {
    pub fn get(&self, workflow_id: &str, step_id: &str) -> Option<&ResolvedOperation> {
        self.ops
            .get(&(workflow_id.to_string(), step_id.to_string()))
    }
}

pub fn compile_document(
    doc: &ArazzoDocument,
    sources: &SourceRegistry,
) -> Result<CompiledOperations, SourceError> {
    let mut compiled = CompiledOperations::default();
    for wf in &doc.workflows {
        for step in &wf.steps {
            let resolved = resolve_step_operation(sources, step)?;
            compiled
                .ops
                .insert((wf.workflow_id.clone(), step.step_id.clone()), resolved);
        }
    }
    Ok(compiled)
}

fn resolve_step_operation(
    sources: &SourceRegistry,
    step: &Step,
) -> Result<ResolvedOperation, SourceError> {
    if let Some(op_id) = &step.operation_id {
        let trimmed = op_id.trim();
        if trimmed.starts_with('$') {
            let (alias, operation_id) = parse_qualified_operation_id(trimmed)?;
            return sources.resolve_operation(Some(&alias), &operation_id);
        }
        return sources.resolve_operation(None, trimmed);
    }

    if let Some(op_path) = &step.operation_path {
        return sources.resolve_operation_path(op_path);
    }

    Err(SourceError::InvalidOperationPath(format!(
        "step '{}' does not reference an operation (missing operationId/operationPath)",
        step.step_id
    )))
}

/// `$sourceDescriptions.<alias>.<operationId>` -> (alias, operationId).
fn parse_qualified_operation_id(expr: &str) -> Result<(String, String), SourceError> {
    let parsed = parse_runtime_expr(expr)
        .map_err(|e| SourceError::InvalidOperationPath(format!("invalid operationId: {e}")))?;
    let RuntimeExpr::SourceDescriptions(np) = parsed else {
        return Err(SourceError::InvalidOperationPath(
            "operationId runtime expression must be $sourceDescriptions.<name>.<operationId>"
                .to_string(),
        ));
    };
    let Some(PathSegment::Key(operation_id)) = np.segments.first() else {
        return Err(SourceError::InvalidOperationPath(
            "qualified operationId must include the operationId segment".to_string(),
        ));
    };
    Ok((np.root, operation_id.clone()))
}
