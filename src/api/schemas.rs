//! Response shapes for the non-run endpoints.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Application status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub version: String,
    pub docs_url: String,
}

/// One entry of the `/docs` endpoint list.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub summary: &'static str,
}

/// Body of `GET /docs`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiDocs {
    pub title: String,
    pub version: String,
    pub endpoints: Vec<EndpointDoc>,
    pub schemas: serde_json::Map<String, serde_json::Value>,
}
