//! Run and tool listing endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tracing::{debug, info};

use super::validation::validate_non_blank;
use super::ApiState;
use crate::types::{Error, Result, RunRequest, RunResult};

/// POST /run
///
/// Validation failures are rejected before the SDK is touched. SDK failures
/// come back as `success: false`; only infrastructure failures are HTTP errors.
pub async fn run_query(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<RunResult>> {
    let Json(body) = payload.map_err(|e| Error::validation(e.body_text()))?;
    let request: RunRequest = state.run_schema.parse(body)?;
    validate_non_blank(&request.query, "query")?;

    info!(
        query_len = request.query.len(),
        tools = ?request.tools,
        "Received run request"
    );
    debug!(query = %request.query, "Run query");

    let result = state.client.execute(&request.query, request.tools).await?;
    Ok(Json(result))
}

/// GET /tools
pub async fn list_tools(State(state): State<ApiState>) -> Result<Json<Vec<String>>> {
    let tools = state.client.available_tools().await?;
    Ok(Json(tools))
}
