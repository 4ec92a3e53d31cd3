//! Agent runner HTTP server - main entry point.
//!
//! Loads settings, refuses to start without an LLM provider key, then serves
//! the API until SIGINT/SIGTERM.

use std::process::ExitCode;
use std::sync::Arc;

use agent_runner::app::{shutdown_signal, AppContext};
use agent_runner::observability::init_tracing;
use agent_runner::sdk::{AgentSdk, RemoteAgent};
use agent_runner::{Result, Settings};

fn main() -> ExitCode {
    let settings = Settings::load();
    init_tracing(
        settings.observability.log_level,
        settings.observability.log_format,
        settings.debug,
    );

    match run(settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(settings: Settings) -> Result<()> {
    settings.validate()?;

    let drain = settings.server.drain_timeout;

    // The blocking HTTP client must be created and dropped outside the async runtime.
    let remote = RemoteAgent::from_settings(&settings)?;
    tracing::info!("Agent runtime at {}", remote.endpoint());
    let sdk: Arc<dyn AgentSdk> = Arc::new(remote);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on({
        let sdk = sdk.clone();
        async move {
            let app = AppContext::start(settings, sdk)?;
            let listener = app.bind().await?;
            tokio::spawn(shutdown_signal(app.shutdown_token()));
            app.serve(listener).await
        }
    });

    runtime.shutdown_timeout(drain);
    drop(sdk);
    result
}
