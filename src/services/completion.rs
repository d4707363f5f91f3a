//! Text-completion provider client.
//!
//! OpenAI-style chat-completions endpoint: one system instruction plus one
//! user prompt in, raw generated text out. The caller owns prompt
//! construction and response parsing; this client only does transport and
//! error mapping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::retry::{RetryConfig, with_retry};
use super::traits::CompletionService;
use crate::{PetMatchError, Result};

/// Default base URL for the completion provider.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default completion model.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature. Low, for consistent recommendation phrasing.
const TEMPERATURE: f32 = 0.4;

/// Completion length cap. A recommendation is a name, a short paragraph,
/// and at most three stat lines.
const MAX_TOKENS: u32 = 300;

/// Client for the completion API.
pub struct CompletionClient {
    api_key: String,
    model: String,
    http: Client,
    base_url: String,
    retry: RetryConfig,
}

impl CompletionClient {
    /// Create a client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            http,
            base_url: base_url.into(),
            retry: RetryConfig::default(),
        }
    }

    /// Override the completion model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the retry configuration.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    async fn request_completion(&self, system_instruction: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages: vec![
                    WireMessage {
                        role: "system",
                        content: system_instruction,
                    },
                    WireMessage {
                        role: "user",
                        content: prompt,
                    },
                ],
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            })
            .send()
            .await
            .map_err(|e| PetMatchError::Http(e.to_string()))?;

        handle_response_errors(&response)?;

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| PetMatchError::Http(e.to_string()))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(PetMatchError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl CompletionService for CompletionClient {
    async fn complete(&self, system_instruction: &str, prompt: &str) -> Result<String> {
        with_retry(&self.retry, "completion", "complete", || {
            self.request_completion(system_instruction, prompt)
        })
        .await
    }
}

/// Check response status and map to the appropriate error.
fn handle_response_errors(response: &reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    match status.as_u16() {
        401 => Err(PetMatchError::AuthenticationFailed),
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(PetMatchError::RateLimited { retry_after })
        }
        code => Err(PetMatchError::Api {
            status: code,
            message: format!("completion API error: {status}"),
        }),
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Deserialize)]
struct WireChoiceMessage {
    content: Option<String>,
}
