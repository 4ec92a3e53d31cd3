//! Agent SDK seam.
//!
//! The SDK plans and executes a query with a set of tools. It is synchronous
//! and may block for a long time, so it is only ever called from the worker
//! pool in [`crate::adapter`]. Implementations must be safe to call from
//! several worker threads at once.

pub mod remote;

use crate::types::RunOutput;
use thiserror::Error;

pub use remote::RemoteAgent;

/// Errors raised by an SDK implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SdkError {
    /// The agent ran and reported a failure. Surfaced to clients as run data.
    #[error("{0}")]
    Provider(String),

    /// The agent could not be reached at all.
    #[error("agent runtime unreachable: {0}")]
    Unavailable(String),

    /// Requested tools are missing from the registry.
    #[error(
        "The following tools are not available: {}. Available tools: {}",
        .unknown.join(", "),
        .available.join(", ")
    )]
    UnknownTools {
        unknown: Vec<String>,
        available: Vec<String>,
    },
}

impl SdkError {
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Whether the failure belongs to the run (data) rather than the service (infrastructure).
    pub fn is_run_failure(&self) -> bool {
        !matches!(self, SdkError::Unavailable(_))
    }
}

/// Synchronous agent SDK.
#[cfg_attr(test, mockall::automock)]
pub trait AgentSdk: Send + Sync {
    /// Run `query`, restricted to `tools` when given.
    fn run(&self, query: &str, tools: Option<Vec<String>>) -> Result<RunOutput, SdkError>;

    /// Identifiers of every registered tool, in registry order.
    fn list_tools(&self) -> Result<Vec<String>, SdkError>;

    /// Liveness probe.
    fn ping(&self) -> Result<(), SdkError> {
        self.list_tools().map(|_| ())
    }
}

/// Identifiers in `requested` that are not in `available`, in request order.
pub fn unknown_tools(requested: &[String], available: &[String]) -> Vec<String> {
    requested
        .iter()
        .filter(|tool| !available.contains(tool))
        .cloned()
        .collect()
}
