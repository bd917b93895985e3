use std::time::Duration;

use async_trait::async_trait;
use quizdesk_job_queue::{ExplanationGenerator, ExplanationInput, JobQueueError};
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::AiError;
use crate::prompt::build_messages;
use crate::types::{ChatRequest, ChatResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Error bodies longer than this are cut before they reach logs and records.
const MAX_ERROR_BODY: usize = 500;

#[derive(Clone, PartialEq)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl std::fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Explanation generator backed by an OpenAI-compatible chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiExplanationClient {
    client: Client,
    settings: OpenAiSettings,
    endpoint: String,
}

impl OpenAiExplanationClient {
    pub fn new(settings: OpenAiSettings) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        let endpoint = format!("{}/chat/completions", settings.base_url.trim_end_matches('/'));
        Ok(Self {
            client,
            settings,
            endpoint,
        })
    }

    pub fn settings(&self) -> &OpenAiSettings {
        &self.settings
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Ask the model for an explanation of `input`'s correct answer.
    pub async fn explain(&self, input: &ExplanationInput) -> Result<String, AiError> {
        let api_key = self.api_key().ok_or(AiError::MissingApiKey)?;
        let messages = build_messages(input);
        let request = ChatRequest {
            model: &self.settings.model,
            messages: &messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            stream: false,
        };

        debug!(endpoint = %self.endpoint, model = %self.settings.model, "requesting explanation");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
            warn!(status = status.as_u16(), "language model request rejected");
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| AiError::Decode(e.to_string()))?;
        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "explanation tokens used"
            );
        }
        parsed
            .first_content()
            .map(str::to_owned)
            .ok_or(AiError::EmptyCompletion)
    }
}

fn truncate_at_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut cut = max;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}

#[async_trait]
impl ExplanationGenerator for OpenAiExplanationClient {
    async fn generate_explanation(
        &self,
        input: &ExplanationInput,
    ) -> Result<String, JobQueueError> {
        self.explain(input).await.map_err(Into::into)
    }
}
