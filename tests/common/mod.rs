//! Shared helpers for integration tests: a stand-in SDK and a server harness.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use agent_runner::app::AppContext;
use agent_runner::sdk::{AgentSdk, SdkError};
use agent_runner::types::{RunOutput, Settings};
use clap::{CommandFactory, Parser};

/// In-process stand-in for the agent SDK.
#[derive(Debug)]
pub struct StubAgent {
    tools: Vec<String>,
    value: String,
    delay: Duration,
    run_error: Option<String>,
    unreachable: AtomicBool,
    run_calls: AtomicUsize,
}

impl StubAgent {
    pub fn new() -> Self {
        Self {
            tools: vec![
                "calculator_tool".to_string(),
                "weather_tool".to_string(),
                "search_tool".to_string(),
            ],
            value: "4.0".to_string(),
            delay: Duration::ZERO,
            run_error: None,
            unreachable: AtomicBool::new(false),
            run_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_tools(mut self, tools: &[&str]) -> Self {
        self.tools = tools.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_run_error(mut self, error: &str) -> Self {
        self.run_error = Some(error.to_string());
        self
    }

    /// Make every SDK call fail as if the runtime were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn run_calls(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), SdkError> {
        if self.unreachable.load(Ordering::SeqCst) {
            Err(SdkError::unavailable("connection refused"))
        } else {
            Ok(())
        }
    }
}

impl AgentSdk for StubAgent {
    fn run(&self, query: &str, _tools: Option<Vec<String>>) -> Result<RunOutput, SdkError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if let Some(error) = &self.run_error {
            return Err(SdkError::provider(error.clone()));
        }
        Ok(RunOutput {
            value: self.value.clone(),
            summary: format!("The query '{query}' was evaluated to give {}.", self.value),
        })
    }

    fn list_tools(&self) -> Result<Vec<String>, SdkError> {
        self.check_reachable()?;
        Ok(self.tools.clone())
    }
}

/// Remove every variable the settings read, so the host environment cannot
/// change what the tests assert on.
fn clear_settings_env() {
    static CLEARED: Once = Once::new();
    CLEARED.call_once(|| {
        for arg in Settings::command().get_arguments() {
            if let Some(var) = arg.get_env() {
                std::env::remove_var(var);
            }
        }
    });
}

/// Settings for tests: defaults plus one provider key, then `extra` flags.
pub fn test_settings(extra: &[&str]) -> Settings {
    clear_settings_env();
    let mut argv = vec![
        "agent-runner",
        "--app-name",
        "Test Runner",
        "--openai-api-key",
        "sk-test-key",
    ];
    argv.extend_from_slice(extra);
    Settings::try_parse_from(argv).unwrap()
}

/// A running server bound to a random local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub app: Arc<AppContext>,
    pub handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Spin up the full app on `127.0.0.1:0` around `sdk`.
pub async fn start_test_server(sdk: Arc<StubAgent>, settings: Settings) -> TestServer {
    let app = Arc::new(AppContext::start(settings, sdk).unwrap());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = {
        let app = app.clone();
        tokio::spawn(async move {
            let _ = app.serve(listener).await;
        })
    };

    TestServer { addr, app, handle }
}
