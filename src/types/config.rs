//! Configuration structures.
//!
//! Configuration is loaded from command-line flags, environment variables and
//! an optional `.env` file in the working directory. Every flag falls back to
//! its environment variable, then to the default listed here.

use axum::http::HeaderValue;
use clap::{Args, Parser, ValueEnum};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::errors::{Error, Result};

/// Global service configuration. Immutable once validated.
#[derive(Debug, Clone, Parser, Serialize)]
#[command(name = "agent-runner", version, about = "Run agent SDK queries over HTTP")]
pub struct Settings {
    /// Application name, shown in the welcome message.
    #[arg(long, env = "APP_NAME", default_value = "Agent Runner")]
    pub app_name: String,

    /// Debug mode (verbose HTTP request logging).
    #[arg(long, env = "DEBUG")]
    pub debug: bool,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub pool: PoolConfig,

    #[command(flatten)]
    pub observability: ObservabilityConfig,

    #[command(flatten)]
    pub agent: AgentConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Args, Serialize)]
pub struct ServerConfig {
    /// Bind host.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Bind port.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Origins allowed by CORS. `*` allows any origin.
    #[arg(long, env = "ALLOWED_DOMAINS", value_delimiter = ',', default_value = "*")]
    pub allowed_domains: Vec<String>,

    /// How long shutdown waits for in-flight requests before giving up on them.
    #[arg(
        long,
        env = "DRAIN_TIMEOUT",
        default_value = "30s",
        value_parser = humantime_serde::re::humantime::parse_duration
    )]
    #[serde(with = "humantime_serde")]
    pub drain_timeout: Duration,
}

impl ServerConfig {
    /// Whether CORS should accept any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_domains.iter().any(|d| d == "*")
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Args, Serialize)]
pub struct PoolConfig {
    /// Maximum number of SDK calls running at once.
    #[arg(
        long,
        env = "MAX_WORKERS",
        default_value_t = 4,
        value_parser = clap::value_parser!(u16).range(1..=256)
    )]
    pub max_workers: u16,

    /// Maximum number of callers waiting for a free worker. Unbounded if unset.
    #[arg(long, env = "MAX_QUEUED")]
    pub max_queued: Option<usize>,

    /// Wall-clock limit for a single run (e.g. `30s`, `2m`). No limit if unset.
    #[arg(
        long,
        env = "RUN_TIMEOUT",
        value_parser = humantime_serde::re::humantime::parse_duration
    )]
    #[serde(with = "humantime_serde")]
    pub run_timeout: Option<Duration>,

    /// Wall-clock limit for the health probe.
    #[arg(
        long,
        env = "HEALTH_TIMEOUT",
        default_value = "5s",
        value_parser = humantime_serde::re::humantime::parse_duration
    )]
    #[serde(with = "humantime_serde")]
    pub health_timeout: Duration,
}

/// Observability configuration.
#[derive(Debug, Clone, Args, Serialize)]
pub struct ObservabilityConfig {
    /// Tracing log level. `RUST_LOG` takes precedence when set.
    #[arg(
        long,
        env = "LOG_LEVEL",
        value_enum,
        ignore_case = true,
        default_value_t = LogLevel::Info
    )]
    pub log_level: LogLevel,

    /// Log output format.
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        ignore_case = true,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,
}

/// Allowed log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Agent runtime configuration.
#[derive(Debug, Clone, Args, Serialize)]
pub struct AgentConfig {
    /// Base URL of the remote agent runtime.
    #[arg(
        long = "agent-endpoint",
        env = "AGENT_ENDPOINT",
        default_value = "http://127.0.0.1:9000"
    )]
    pub endpoint: String,

    /// LLM provider used by the agent. Inferred from the first configured key if unset.
    #[arg(long, env = "LLM_PROVIDER", value_enum, ignore_case = true)]
    pub llm_provider: Option<LlmProvider>,

    /// Default generative model forwarded to the runtime.
    #[arg(long, env = "DEFAULT_MODEL")]
    pub default_model: Option<String>,

    #[command(flatten)]
    pub models: ModelOverrides,

    /// Where the runtime keeps run state.
    #[arg(long, env = "STORAGE_CLASS", value_enum, ignore_case = true)]
    pub storage_class: Option<StorageClass>,

    /// Directory for `disk` storage.
    #[arg(long, env = "STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    #[command(flatten)]
    #[serde(skip)]
    pub credentials: Credentials,
}

/// Per-agent model choices. Unset entries fall back to the default model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args, Serialize)]
pub struct ModelOverrides {
    #[arg(long, env = "PLANNING_MODEL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planning_model: Option<String>,

    #[arg(long, env = "EXECUTION_MODEL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_model: Option<String>,

    #[arg(long, env = "INTROSPECTION_MODEL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introspection_model: Option<String>,

    #[arg(long, env = "SUMMARIZER_MODEL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarizer_model: Option<String>,
}

impl ModelOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Run state storage used by the agent runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageClass {
    Memory,
    Disk,
    Cloud,
}

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
pub enum LlmProvider {
    #[value(name = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    #[value(name = "anthropic")]
    #[serde(rename = "anthropic")]
    Anthropic,
    #[value(name = "mistralai")]
    #[serde(rename = "mistralai")]
    MistralAi,
    #[value(name = "google")]
    #[serde(rename = "google")]
    Google,
    #[value(name = "azure-openai")]
    #[serde(rename = "azure-openai")]
    AzureOpenAi,
}

impl LlmProvider {
    /// Preference order when the provider is inferred from the configured keys.
    pub const ALL: [LlmProvider; 5] = [
        LlmProvider::OpenAi,
        LlmProvider::Anthropic,
        LlmProvider::MistralAi,
        LlmProvider::Google,
        LlmProvider::AzureOpenAi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::MistralAi => "mistralai",
            LlmProvider::Google => "google",
            LlmProvider::AzureOpenAi => "azure-openai",
        }
    }

    /// Environment variable holding this provider's key.
    pub fn key_var(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
            LlmProvider::MistralAi => "MISTRAL_API_KEY",
            LlmProvider::Google => "GOOGLE_API_KEY",
            LlmProvider::AzureOpenAi => "AZURE_OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider credentials. Never serialized, never printed.
#[derive(Debug, Clone, Default, Args)]
pub struct Credentials {
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<Secret>,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<Secret>,

    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    pub mistral_api_key: Option<Secret>,

    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<Secret>,

    #[arg(long, env = "AZURE_OPENAI_API_KEY", hide_env_values = true)]
    pub azure_openai_api_key: Option<Secret>,

    /// Key for the agent runtime itself (not an LLM provider key).
    #[arg(long, env = "AGENT_API_KEY", hide_env_values = true)]
    pub agent_api_key: Option<Secret>,
}

impl Credentials {
    /// Key for the given provider, ignoring empty values.
    pub fn key_for(&self, provider: LlmProvider) -> Option<&Secret> {
        let key = match provider {
            LlmProvider::OpenAi => &self.openai_api_key,
            LlmProvider::Anthropic => &self.anthropic_api_key,
            LlmProvider::MistralAi => &self.mistral_api_key,
            LlmProvider::Google => &self.google_api_key,
            LlmProvider::AzureOpenAi => &self.azure_openai_api_key,
        };
        key.as_ref().filter(|secret| !secret.is_empty())
    }

    /// Providers with a key configured, in preference order.
    pub fn configured_providers(&self) -> Vec<LlmProvider> {
        LlmProvider::ALL
            .into_iter()
            .filter(|p| self.key_for(*p).is_some())
            .collect()
    }

    pub fn agent_key(&self) -> Option<&Secret> {
        self.agent_api_key.as_ref().filter(|secret| !secret.is_empty())
    }
}

/// Opaque secret value. `Debug` and `Display` never reveal the contents.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw value. Only call this at the point of use.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl Settings {
    /// Load settings from `.env`, the environment and the command line.
    ///
    /// Exits the process with a usage message on malformed values.
    pub fn load() -> Self {
        // Real environment variables win over `.env` entries.
        let _ = dotenv::dotenv();
        Self::parse()
    }

    /// Check cross-field invariants. Called once at startup.
    pub fn validate(&self) -> Result<()> {
        let configured = self.agent.credentials.configured_providers();
        if configured.is_empty() {
            let vars: Vec<&str> = LlmProvider::ALL.iter().map(|p| p.key_var()).collect();
            return Err(Error::config(format!(
                "at least one LLM provider API key must be set ({})",
                vars.join(", ")
            )));
        }

        if let Some(provider) = self.agent.llm_provider {
            if self.agent.credentials.key_for(provider).is_none() {
                return Err(Error::config(format!(
                    "LLM_PROVIDER is {} but {} is not set",
                    provider,
                    provider.key_var()
                )));
            }
        }

        let disk = self.agent.storage_class == Some(StorageClass::Disk);
        if self.agent.storage_dir.is_some() && !disk {
            return Err(Error::config("STORAGE_DIR requires STORAGE_CLASS=disk"));
        }

        for origin in &self.server.allowed_domains {
            if origin != "*" && HeaderValue::from_str(origin).is_err() {
                return Err(Error::config(format!("invalid CORS origin: {origin:?}")));
            }
        }

        reqwest::Url::parse(&self.agent.endpoint).map_err(|e| {
            Error::config(format!("invalid AGENT_ENDPOINT {:?}: {}", self.agent.endpoint, e))
        })?;

        Ok(())
    }

    /// Provider the agent runs with: explicit choice, else the first configured key.
    pub fn llm_provider(&self) -> Option<LlmProvider> {
        self.agent
            .llm_provider
            .or_else(|| self.agent.credentials.configured_providers().first().copied())
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
