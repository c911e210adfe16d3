//! Ollama client for turning document text into JSONL training records.
//!
//! One `OllamaClient` owns one HTTP agent; callers construct it once and pass
//! it wherever generation happens. Each `generate()` is a single
//! non-streaming POST to `/api/generate` with no retries.

pub mod prompt;

use std::io::Read;
use std::time::Duration;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FailureKind;

pub use prompt::build_prompt;

/// Where Ollama listens unless configured otherwise.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Errors from the LLM subsystem.
///
/// Display strings are the in-band messages returned by
/// [`OllamaClient::generate_or_message`].
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("Error connecting to Ollama: {message}. Make sure Ollama is running.")]
    #[diagnostic(
        code(sft::llm::unavailable),
        help("Start Ollama with `ollama serve`, or point --ollama-url at a running server.")
    )]
    Unavailable { url: String, message: String },

    #[error("Error: {code} - {body}")]
    #[diagnostic(
        code(sft::llm::status),
        help("Check that the model is pulled (`ollama list`) and the request is valid.")
    )]
    Status { code: u16, body: String },

    #[error("Error parsing Ollama response: {message}")]
    #[diagnostic(
        code(sft::llm::parse_error),
        help("The server returned an unexpected response format. Check the Ollama version.")
    )]
    ParseError { message: String },
}

impl LlmError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Unavailable { .. } => FailureKind::Transport,
            Self::Status { .. } => FailureKind::Protocol,
            Self::ParseError { .. } => FailureKind::Deserialization,
        }
    }
}

pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Configuration for the Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL for the Ollama API.
    pub base_url: String,
    /// Whole-request timeout for generation; `None` keeps the HTTP library default.
    pub timeout_secs: Option<u64>,
    /// Timeout for the lightweight `/api/tags` probe.
    pub probe_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.into(),
            timeout_secs: None,
            probe_timeout_secs: 5,
        }
    }
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
}

/// Non-streaming reply from `/api/generate`. Extra fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub model: String,
    pub created_at: String,
    pub response: String,
    pub done: bool,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Client for the Ollama REST API.
pub struct OllamaClient {
    config: OllamaConfig,
    agent: ureq::Agent,
}

impl OllamaClient {
    /// Create a client; the underlying agent is reused for every request.
    pub fn new(config: OllamaConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Self {
            agent: builder.build(),
            config,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Convert document text to JSONL with `model`.
    ///
    /// Returns the model's `response` field verbatim; its JSONL shape is not
    /// checked.
    pub fn generate(&self, text: &str, model: &str) -> LlmResult<String> {
        let prompt = build_prompt(text);
        let url = self.endpoint("api/generate");
        let request = GenerateRequest {
            model,
            prompt: &prompt,
            stream: false,
        };

        tracing::info!(%url, model, prompt_chars = prompt.chars().count(), "requesting generation");

        let resp = match self.agent.post(&url).send_json(&request) {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                tracing::warn!(code, "Ollama returned an error status");
                return Err(LlmError::Status { code, body });
            }
            Err(ureq::Error::Transport(t)) => {
                return Err(LlmError::Unavailable {
                    url,
                    message: t.to_string(),
                });
            }
        };

        // ureq only reports 4xx/5xx as errors.
        let code = resp.status();
        if code != 200 {
            let body = resp.into_string().unwrap_or_default();
            tracing::warn!(code, "Ollama returned an unexpected status");
            return Err(LlmError::Status { code, body });
        }

        // Past a 200 status, anything wrong with the body is a parse failure.
        let mut body = Vec::new();
        resp.into_reader()
            .read_to_end(&mut body)
            .map_err(|e| LlmError::ParseError {
                message: format!("read body: {e}"),
            })?;

        let parsed: GenerateResponse =
            serde_json::from_slice(&body).map_err(|e| LlmError::ParseError {
                message: e.to_string(),
            })?;

        tracing::info!(
            model = %parsed.model,
            done = parsed.done,
            response_chars = parsed.response.chars().count(),
            "generation finished"
        );
        Ok(parsed.response)
    }

    /// Like [`generate`](Self::generate), but never fails: on error the
    /// error's message is returned in place of the generated text.
    pub fn generate_or_message(&self, text: &str, model: &str) -> String {
        match self.generate(text, model) {
            Ok(jsonl) => jsonl,
            Err(e) => {
                tracing::warn!(kind = %e.kind(), "{e}");
                e.to_string()
            }
        }
    }

    /// Check whether the server answers `/api/tags` with 200.
    pub fn probe(&self) -> bool {
        let url = self.endpoint("api/tags");
        match self
            .agent
            .get(&url)
            .timeout(Duration::from_secs(self.config.probe_timeout_secs))
            .call()
        {
            Ok(resp) => resp.status() == 200,
            Err(e) => {
                tracing::debug!(%url, "probe failed: {e}");
                false
            }
        }
    }

    /// Model names the running server reports as available.
    pub fn remote_models(&self) -> LlmResult<Vec<String>> {
        let url = self.endpoint("api/tags");
        let resp = self
            .agent
            .get(&url)
            .timeout(Duration::from_secs(self.config.probe_timeout_secs))
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => LlmError::Status {
                    code,
                    body: resp.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(t) => LlmError::Unavailable {
                    url: url.clone(),
                    message: t.to_string(),
                },
            })?;

        let tags: TagsResponse = resp.into_json().map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("base_url", &self.config.base_url)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}
