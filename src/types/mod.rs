//! Core types for the service.
//!
//! This module provides foundational types used throughout the system:
//! - **Config**: Settings loaded once at startup
//! - **Errors**: Application error types with thiserror derives
//! - **Run**: Request and result shapes exchanged over HTTP
//! - **IDs**: Run identifiers for log correlation

mod config;
mod errors;
mod ids;
mod run;

pub use config::{
    AgentConfig, Credentials, LlmProvider, LogFormat, LogLevel, ModelOverrides,
    ObservabilityConfig, PoolConfig, Secret, ServerConfig, Settings, StorageClass,
};
pub use errors::{Error, Result};
pub use ids::RunId;
pub use run::{RunOutput, RunRequest, RunResult};
