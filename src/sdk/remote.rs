//! Remote agent runtime client.
//!
//! Talks to an agent runtime over HTTP with a blocking client. Each call
//! occupies the calling worker thread until the runtime answers.
//!
//! Wire contract:
//! - `GET  {endpoint}/health` → any 2xx
//! - `GET  {endpoint}/tools`  → `["tool_id", ...]`
//! - `POST {endpoint}/run`    → `{"value": ..., "summary": ...}`

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, instrument};

use super::{AgentSdk, SdkError};
use crate::types::{
    Error, LlmProvider, ModelOverrides, Result, RunOutput, Secret, Settings, StorageClass,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROVIDER_KEY_HEADER: &str = "X-LLM-Api-Key";

/// HTTP-backed [`AgentSdk`].
#[derive(Debug)]
pub struct RemoteAgent {
    client: Client,
    endpoint: String,
    provider: Option<LlmProvider>,
    provider_key: Option<Secret>,
    agent_key: Option<Secret>,
    model: Option<String>,
    models: ModelOverrides,
    storage_class: Option<StorageClass>,
    storage_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunBody<'a> {
    query: &'a str,
    tools: Option<Vec<String>>,
    llm_provider: Option<&'static str>,
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "no_overrides")]
    models: &'a ModelOverrides,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_class: Option<StorageClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_dir: Option<&'a Path>,
}

impl RemoteAgent {
    /// Client for the runtime at `endpoint`. `request_timeout` bounds each
    /// HTTP exchange; `None` waits indefinitely.
    ///
    /// Must not be called from an async context: the blocking client owns
    /// its own runtime.
    pub fn new(endpoint: impl Into<String>, request_timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .user_agent(concat!("agent-runner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            provider: None,
            provider_key: None,
            agent_key: None,
            model: None,
            models: ModelOverrides::default(),
            storage_class: None,
            storage_dir: None,
        })
    }

    /// Client configured from validated settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut agent = Self::new(&settings.agent.endpoint, settings.pool.run_timeout)?;
        if let Some(provider) = settings.llm_provider() {
            let key = settings.agent.credentials.key_for(provider).cloned();
            agent = agent.with_provider(provider, key);
        }
        if let Some(key) = settings.agent.credentials.agent_key() {
            agent = agent.with_agent_key(key.clone());
        }
        if let Some(model) = &settings.agent.default_model {
            agent = agent.with_model(model.clone());
        }
        if let Some(class) = settings.agent.storage_class {
            agent = agent.with_storage(class, settings.agent.storage_dir.clone());
        }
        Ok(agent.with_models(settings.agent.models.clone()))
    }

    pub fn with_provider(mut self, provider: LlmProvider, key: Option<Secret>) -> Self {
        self.provider = Some(provider);
        self.provider_key = key;
        self
    }

    pub fn with_agent_key(mut self, key: Secret) -> Self {
        self.agent_key = Some(key);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_models(mut self, models: ModelOverrides) -> Self {
        self.models = models;
        self
    }

    pub fn with_storage(mut self, class: StorageClass, dir: Option<PathBuf>) -> Self {
        self.storage_class = Some(class);
        self.storage_dir = dir;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.agent_key {
            Some(key) => request.bearer_auth(key.expose()),
            None => request,
        };
        match &self.provider_key {
            Some(key) => request.header(PROVIDER_KEY_HEADER, key.expose()),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> std::result::Result<Response, SdkError> {
        let response = self.authorize(request).send().map_err(transport_error)?;
        check_status(response)
    }
}

impl AgentSdk for RemoteAgent {
    #[instrument(skip(self, query), fields(endpoint = %self.endpoint))]
    fn run(
        &self,
        query: &str,
        tools: Option<Vec<String>>,
    ) -> std::result::Result<RunOutput, SdkError> {
        let body = RunBody {
            query,
            tools,
            llm_provider: self.provider.map(LlmProvider::as_str),
            model: self.model.as_deref(),
            models: &self.models,
            storage_class: self.storage_class,
            storage_dir: self.storage_dir.as_deref(),
        };
        debug!("Sending run request to agent runtime");

        let response = self.send(self.client.post(self.url("run")).json(&body))?;
        response
            .json::<RunOutput>()
            .map_err(|e| SdkError::provider(format!("invalid run output from agent runtime: {e}")))
    }

    fn list_tools(&self) -> std::result::Result<Vec<String>, SdkError> {
        let response = self.send(self.client.get(self.url("tools")))?;
        response
            .json::<Vec<String>>()
            .map_err(|e| SdkError::provider(format!("invalid tool list from agent runtime: {e}")))
    }

    fn ping(&self) -> std::result::Result<(), SdkError> {
        self.send(self.client.get(self.url("health"))).map(|_| ())
    }
}

fn no_overrides(models: &&ModelOverrides) -> bool {
    models.is_empty()
}

fn transport_error(err: reqwest::Error) -> SdkError {
    if err.is_connect() || err.is_timeout() {
        SdkError::unavailable(err.to_string())
    } else {
        SdkError::provider(err.to_string())
    }
}

fn check_status(response: Response) -> std::result::Result<Response, SdkError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = error_message(&body);
    match status {
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => Err(SdkError::unavailable(
            format!("agent runtime returned {}: {}", status.as_u16(), message),
        )),
        _ => Err(SdkError::provider(message)),
    }
}

/// Pull `error` or `detail` out of a JSON error body, else use the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "detail"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}
