use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default per-call timeout for naming requests.
pub const DEFAULT_NAMING_TIMEOUT: Duration = Duration::from_secs(8);

/// Plain prompt-in, text-out model access. `None` means "no usable answer",
/// whatever the reason.
pub trait TextInference: Send + Sync {
    fn infer_text(&self, prompt: &str) -> Option<String>;
}

fn blocking_client(timeout: Duration) -> Option<reqwest::blocking::Client> {
    match reqwest::blocking::Client::builder().timeout(timeout).build() {
        Ok(client) => Some(client),
        Err(e) => {
            debug!(error = %e, "could not build HTTP client for naming backend");
            None
        }
    }
}

// ============================================================================
// Ollama Backend
// ============================================================================

pub struct OllamaBackend {
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "qwen2.5:1.5b".to_string(),
            timeout: DEFAULT_NAMING_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaBackend {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            timeout,
        }
    }
}

impl TextInference for OllamaBackend {
    fn infer_text(&self, prompt: &str) -> Option<String> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = blocking_client(self.timeout)?
            .post(&self.endpoint)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| debug!(error = %e, "ollama request failed"))
            .ok()?;

        let parsed: OllamaResponse = response
            .json()
            .map_err(|e| debug!(error = %e, "malformed ollama response"))
            .ok()?;
        Some(parsed.response)
    }
}

// ============================================================================
// OpenAI-compatible chat completions backend
// ============================================================================

pub struct OpenAiBackend {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl OpenAiBackend {
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1/chat/completions";
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    pub fn new(api_key: &str) -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            api_key: api_key.to_string(),
            timeout: DEFAULT_NAMING_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl TextInference for OpenAiBackend {
    fn infer_text(&self, prompt: &str) -> Option<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You name UI test cases succinctly.",
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.3,
            max_tokens: 40,
        };

        let response = blocking_client(self.timeout)?
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| debug!(error = %e, "chat completion request failed"))
            .ok()?;

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| debug!(error = %e, "malformed chat completion response"))
            .ok()?;
        parsed.choices.into_iter().next()?.message.content
    }
}

// ============================================================================
// Mock Backend (for testing without a model)
// ============================================================================

/// Returns a canned response, or nothing when `response` is `None`.
pub struct MockTextInference {
    pub response: Option<String>,
}

impl MockTextInference {
    pub fn replying(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { response: None }
    }
}

impl TextInference for MockTextInference {
    fn infer_text(&self, _prompt: &str) -> Option<String> {
        self.response.clone()
    }
}
