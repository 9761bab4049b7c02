use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::ExecutionState;

/// In-memory home of all live executions. Each execution sits behind its own
/// lock so two advancement calls on the same execution serialize, while
/// different executions advance independently.
#[derive(Default)]
pub struct ExecutionRegistry {
    executions: RwLock<HashMap<Uuid, Arc<Mutex<ExecutionState>>>>,
}

impl ExecutionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, state: ExecutionState) -> Arc<Mutex<ExecutionState>> {
        let id = state.execution_id;
        let entry = Arc::new(Mutex::new(state));
        self.executions.write().await.insert(id, Arc::clone(&entry));
        entry
    }

    pub async fn get(&self, execution_id: Uuid) -> Option<Arc<Mutex<ExecutionState>>> {
        self.executions.read().await.get(&execution_id).cloned()
    }

    /// Drop an execution's state. Terminal executions are retained until the
    /// caller removes them, so results stay queryable.
    pub async fn remove(&self, execution_id: Uuid) -> Option<Arc<Mutex<ExecutionState>>> {
        self.executions.write().await.remove(&execution_id)
    }

    pub async fn len(&self) -> usize {
        self.executions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.executions.read().await.is_empty()
    }
}
