//! HTTP API.
//!
//! Routes:
//! - `GET  /`       welcome message
//! - `GET  /health` service + SDK liveness
//! - `POST /run`    execute a query
//! - `GET  /tools`  registered tool identifiers
//! - `GET  /docs`   endpoint list and JSON schemas

pub mod health;
pub mod run;
pub mod schemas;
pub mod validation;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method, Uri};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::adapter::AgentClient;
use crate::types::{Error, Result, RunRequest, ServerConfig, Settings};
use validation::SchemaValidator;

/// Shared handler state. Cloned per request; everything inside is shared.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub settings: Arc<Settings>,
    pub client: AgentClient,
    pub run_schema: Arc<SchemaValidator>,
}

impl ApiState {
    pub fn new(settings: Arc<Settings>, client: AgentClient) -> Result<Self> {
        Ok(Self {
            settings,
            client,
            run_schema: Arc::new(SchemaValidator::for_type::<RunRequest>()?),
        })
    }
}

/// Create the API router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health_check))
        .route("/run", post(run::run_query))
        .route("/tools", get(run::list_tools))
        .route(health::DOCS_URL, get(health::api_docs))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> Error {
    Error::not_found(format!("no route for {}", uri.path()))
}

/// CORS policy from the allow-list. `*` allows any origin without
/// credentials; an explicit list allows credentials.
pub fn cors_layer(server: &ServerConfig) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if server.allows_any_origin() {
        return Ok(layer.allow_origin(AllowOrigin::any()));
    }

    let origins = server
        .allowed_domains
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| Error::config(format!("invalid CORS origin: {origin:?}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(origins).allow_credentials(true))
}
