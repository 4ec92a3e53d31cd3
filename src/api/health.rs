//! Welcome, health and docs endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::warn;

use super::schemas::{ApiDocs, EndpointDoc, HealthResponse, HealthStatus, WelcomeResponse};
use super::ApiState;
use crate::types::RunResult;
use crate::VERSION;

pub const DOCS_URL: &str = "/docs";

/// GET /
pub async fn welcome(State(state): State<ApiState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to {}", state.settings.app_name),
        version: VERSION.to_string(),
        docs_url: DOCS_URL.to_string(),
    })
}

/// GET /health
pub async fn health_check(State(state): State<ApiState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = match state.client.check().await {
        Ok(()) => (StatusCode::OK, HealthStatus::Healthy),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Unhealthy)
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: VERSION.to_string(),
        }),
    )
}

/// GET /docs
pub async fn api_docs(State(state): State<ApiState>) -> Json<ApiDocs> {
    let mut schemas = serde_json::Map::new();
    schemas.insert("RunRequest".into(), state.run_schema.schema().clone());
    schemas.insert(
        "RunResult".into(),
        serde_json::to_value(schemars::schema_for!(RunResult)).unwrap_or_default(),
    );
    schemas.insert(
        "HealthResponse".into(),
        serde_json::to_value(schemars::schema_for!(HealthResponse)).unwrap_or_default(),
    );

    Json(ApiDocs {
        title: state.settings.app_name.clone(),
        version: VERSION.to_string(),
        endpoints: vec![
            EndpointDoc {
                method: "GET",
                path: "/",
                summary: "Welcome message",
            },
            EndpointDoc {
                method: "GET",
                path: "/health",
                summary: "Health of the service and the agent SDK",
            },
            EndpointDoc {
                method: "POST",
                path: "/run",
                summary: "Execute a query with an optional list of tools",
            },
            EndpointDoc {
                method: "GET",
                path: "/tools",
                summary: "Identifiers of the tools the agent SDK provides",
            },
            EndpointDoc {
                method: "GET",
                path: DOCS_URL,
                summary: "This document",
            },
        ],
        schemas,
    })
}
