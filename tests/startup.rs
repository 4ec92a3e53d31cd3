//! Startup behavior: fail fast on missing credentials, never log secrets.

mod common;

use std::sync::Arc;

use agent_runner::app::AppContext;
use agent_runner::types::{Credentials, Secret};
use agent_runner::Error;
use common::{test_settings, StubAgent};
use tracing_test::traced_test;

#[test]
fn test_missing_provider_key_is_fatal() {
    let mut settings = test_settings(&[]);
    settings.agent.credentials = Credentials {
        agent_api_key: Some(Secret::new("agent-only")),
        ..Credentials::default()
    };

    let err = AppContext::start(settings, Arc::new(StubAgent::new())).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

#[test]
fn test_blank_provider_key_is_not_a_key() {
    let mut settings = test_settings(&[]);
    settings.agent.credentials = Credentials {
        anthropic_api_key: Some(Secret::new("   ")),
        ..Credentials::default()
    };

    let err = AppContext::start(settings, Arc::new(StubAgent::new())).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[traced_test]
fn test_startup_logs_config_without_secrets() {
    let mut settings = test_settings(&["--max-workers", "7"]);
    settings.agent.credentials.openai_api_key = Some(Secret::new("sk-very-secret-123"));
    settings.agent.credentials.agent_api_key = Some(Secret::new("agent-very-secret-456"));

    let app = AppContext::start(settings, Arc::new(StubAgent::new())).unwrap();

    assert_eq!(app.client().pool().size(), 7);
    assert!(logs_contain("Effective configuration"));
    assert!(logs_contain("max_workers"));
    assert!(logs_contain("workers=7"));
    assert!(!logs_contain("sk-very-secret-123"));
    assert!(!logs_contain("agent-very-secret-456"));
}
