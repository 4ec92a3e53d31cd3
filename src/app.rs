//! Process lifecycle.
//!
//! `AppContext` owns the long-lived pieces (settings, worker pool, SDK
//! handle) from startup to teardown and hands them to the router by
//! reference. Dropping it closes the pool.

use std::future::IntoFuture;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::adapter::AgentClient;
use crate::api::{self, ApiState};
use crate::sdk::AgentSdk;
use crate::types::{Result, Settings};
use crate::VERSION;

/// Application context: everything that lives for the whole process.
#[derive(Debug)]
pub struct AppContext {
    settings: Arc<Settings>,
    client: AgentClient,
    cors: CorsLayer,
    cancel: CancellationToken,
}

impl AppContext {
    /// Validate settings and build the worker pool around `sdk`.
    ///
    /// Fails with a configuration error, before anything is bound, when no
    /// LLM provider key is configured.
    pub fn start(settings: Settings, sdk: Arc<dyn AgentSdk>) -> Result<Self> {
        settings.validate()?;
        let cors = api::cors_layer(&settings.server)?;
        let client = AgentClient::new(sdk, &settings.pool);

        info!(
            "Starting {} v{} (workers={}, provider={})",
            settings.app_name,
            VERSION,
            settings.pool.max_workers,
            settings
                .llm_provider()
                .map_or("none", |p| p.as_str()),
        );
        info!(config = %serde_json::to_string(&settings)?, "Effective configuration");

        Ok(Self {
            settings: Arc::new(settings),
            client,
            cors,
            cancel: CancellationToken::new(),
        })
    }

    pub fn client(&self) -> &AgentClient {
        &self.client
    }

    /// Router with state, request tracing and CORS.
    pub fn router(&self) -> Result<Router> {
        let state = ApiState::new(self.settings.clone(), self.client.clone())?;
        Ok(api::create_router(state)
            .layer(TraceLayer::new_for_http())
            .layer(self.cors.clone()))
    }

    /// Bind the configured `host:port`.
    pub async fn bind(&self) -> Result<TcpListener> {
        Ok(TcpListener::bind(self.settings.bind_addr()).await?)
    }

    /// Serve until [`AppContext::shutdown`] is called.
    ///
    /// On shutdown the pool closes first, so callers still waiting for a
    /// worker fail fast with 503. Requests already running get up to the
    /// drain timeout to finish; past it `serve` returns without them.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let router = self.router()?;
        info!("Listening on http://{}", listener.local_addr()?);

        let cancel = self.cancel.clone();
        let client = self.client.clone();
        let graceful = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                client.shutdown();
            })
            .into_future();

        let drain = self.settings.server.drain_timeout;
        let deadline = async {
            self.cancel.cancelled().await;
            tokio::time::sleep(drain).await;
        };

        tokio::select! {
            result = graceful => result?,
            () = deadline => {
                warn!("Requests still running after {:?}, not waiting for them", drain);
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Token that stops [`AppContext::serve`] when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop serving and close the worker pool. Idempotent.
    pub fn shutdown(&self) {
        if !self.client.pool().is_closed() {
            info!("Shutting down");
        }
        self.cancel.cancel();
        self.client.shutdown();
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Cancel `token` on SIGINT or SIGTERM.
pub async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = token.cancelled() => return,
    }
    info!("Shutdown signal received");
    token.cancel();
}
