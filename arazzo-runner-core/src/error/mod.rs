use thiserror::Error;

/// Errors raised while turning raw bytes into a usable workflow document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
#[error("arazzo document failed validation ({count} violations)")]
pub struct ValidationError {
    pub violations: Vec<Violation>,
    count: usize,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        let count = violations.len();
        Self { violations, count }
    }
}

/// A single validation finding, addressed by a JSONPath-like location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}
