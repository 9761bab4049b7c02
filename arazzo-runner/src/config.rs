use std::time::Duration;

/// What the state machine does when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Freeze the execution at the first failure; repeated advancement calls
    /// return the same terminal result without re-executing.
    #[default]
    Halt,
    /// Record the failure and keep advancing. Later expressions referencing
    /// the failed step's outputs will themselves fail, and the terminal
    /// status is `Failed` whenever any step failed.
    Continue,
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Upper bound on a single step's outbound call, connect to last byte.
    pub step_timeout: Duration,
    /// Responses larger than this fail the step instead of being buffered.
    pub max_response_bytes: usize,
    pub failure_mode: FailureMode,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_secs(30),
            max_response_bytes: 4 * 1024 * 1024,
            failure_mode: FailureMode::Halt,
        }
    }
}
