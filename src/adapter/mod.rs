//! Agent client adapter.
//!
//! Turns the synchronous [`AgentSdk`] into async operations backed by the
//! [`WorkerPool`]. SDK failures inside a run become [`RunResult`] data;
//! pool, timeout and reachability problems come back as [`Error`].

pub mod pool;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn, Instrument};

use crate::sdk::{unknown_tools, AgentSdk, SdkError};
use crate::types::{Error, PoolConfig, Result, RunId, RunOutput, RunResult};

pub use pool::WorkerPool;

/// Async front for the agent SDK. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct AgentClient {
    sdk: Arc<dyn AgentSdk>,
    pool: WorkerPool,
    run_timeout: Option<Duration>,
    health_timeout: Duration,
}

impl fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentClient")
            .field("pool", &self.pool)
            .field("run_timeout", &self.run_timeout)
            .field("health_timeout", &self.health_timeout)
            .finish_non_exhaustive()
    }
}

impl AgentClient {
    pub fn new(sdk: Arc<dyn AgentSdk>, config: &PoolConfig) -> Self {
        Self {
            sdk,
            pool: WorkerPool::new(usize::from(config.max_workers), config.max_queued),
            run_timeout: config.run_timeout,
            health_timeout: config.health_timeout,
        }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Execute `query` on a worker, restricted to `tools` when given.
    pub async fn execute(&self, query: &str, tools: Option<Vec<String>>) -> Result<RunResult> {
        let run_id = RunId::new();
        let span = tracing::info_span!(
            "run",
            run_id = %run_id,
            tools = tools.as_ref().map_or(0, Vec::len),
        );

        async move {
            let started = Instant::now();
            let sdk = self.sdk.clone();
            let query = query.to_string();

            let outcome = self
                .pool
                .submit(move || run_with_tools(sdk.as_ref(), &query, tools), self.run_timeout)
                .await
                .inspect_err(|e| {
                    warn!(
                        "Run aborted after {:.2}s: {}",
                        started.elapsed().as_secs_f64(),
                        e
                    )
                })?;
            let elapsed = started.elapsed();

            match outcome {
                Ok(output) => {
                    info!("Query executed successfully in {:.2}s", elapsed.as_secs_f64());
                    Ok(RunResult::succeeded(output, elapsed))
                }
                Err(err) if err.is_run_failure() => {
                    warn!("Query execution failed after {:.2}s: {}", elapsed.as_secs_f64(), err);
                    Ok(RunResult::failed(err.to_string(), elapsed))
                }
                Err(err) => Err(Error::unavailable(err.to_string())),
            }
        }
        .instrument(span)
        .await
    }

    /// Every tool identifier the SDK registers, in SDK order.
    pub async fn available_tools(&self) -> Result<Vec<String>> {
        let sdk = self.sdk.clone();
        self.pool
            .submit(move || sdk.list_tools(), self.run_timeout)
            .await?
            .map_err(|e| Error::upstream(format!("Failed to get available tools: {e}")))
    }

    /// Liveness check against the SDK, bounded by the health timeout.
    pub async fn check(&self) -> Result<()> {
        let sdk = self.sdk.clone();
        self.pool
            .submit(move || sdk.ping(), Some(self.health_timeout))
            .await?
            .map_err(|e| Error::unavailable(e.to_string()))
    }

    /// Close the worker pool. In-flight calls finish; new ones fail.
    pub fn shutdown(&self) {
        self.pool.close();
    }
}

/// Runs on the worker thread: check requested tools, then run.
fn run_with_tools(
    sdk: &dyn AgentSdk,
    query: &str,
    tools: Option<Vec<String>>,
) -> std::result::Result<RunOutput, SdkError> {
    if let Some(requested) = tools.as_deref().filter(|t| !t.is_empty()) {
        let available = sdk.list_tools()?;
        let unknown = unknown_tools(requested, &available);
        if !unknown.is_empty() {
            return Err(SdkError::UnknownTools { unknown, available });
        }
    }
    sdk.run(query, tools)
}
