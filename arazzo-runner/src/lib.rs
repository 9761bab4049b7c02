#![forbid(unsafe_code)]

//! In-memory execution engine for Arazzo workflows.
//!
//! Document parsing and validation live in `arazzo-runner-core`; this crate
//! resolves step operations against registered OpenAPI descriptions, drives
//! executions one step at a time (or to completion), and keeps each
//! execution's accumulated outputs addressable by runtime expressions.

pub mod compile;
pub mod config;
pub mod error;
pub mod eval;
pub mod events;
pub mod exec;
pub mod runner;
pub mod sources;
pub mod state;

pub use crate::config::{FailureMode, RunnerConfig};
pub use crate::error::RunnerError;
pub use crate::eval::{EvalError, ExprContext, ResponseView};
pub use crate::events::{Event, EventSink, NoOpEventSink, StdoutEventSink};
pub use crate::exec::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts, ReqwestHttpClient};
pub use crate::runner::Runner;
pub use crate::sources::{ResolvedOperation, SourceError, SourceRegistry};
pub use crate::state::{
    ExecutionRegistry, ExecutionSnapshot, ExecutionStatus, StepOutcome, WorkflowResult,
};
