use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompt::{build_messages, ChatMessage};
use super::{NarrativeError, NarrativeGenerator, NarrativeRequest};
use crate::config::NarrativeConfig;

/// Chat-completion client for OpenAI and API-compatible providers.
#[derive(Clone)]
pub struct OpenAiNarrativeClient {
    client: Client,
    api_key: String,
    config: NarrativeConfig,
}

impl fmt::Debug for OpenAiNarrativeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiNarrativeClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiNarrativeClient {
    /// Fails with [`NarrativeError::NotConfigured`] when the config carries no API key.
    pub fn new(config: NarrativeConfig) -> Result<Self, NarrativeError> {
        let api_key = config.api_key.clone().ok_or(NarrativeError::NotConfigured)?;
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

#[async_trait]
impl NarrativeGenerator for OpenAiNarrativeClient {
    async fn generate(&self, request: &NarrativeRequest) -> Result<String, NarrativeError> {
        let url = self.endpoint();
        let body = CompletionRequest {
            model: &self.config.model,
            messages: build_messages(request),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(%url, model = %self.config.model, "requesting risk narrative");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED => NarrativeError::InvalidApiKey,
                StatusCode::TOO_MANY_REQUESTS => NarrativeError::RateLimited,
                _ => NarrativeError::Api {
                    status: status.as_u16(),
                    body: response.text().await.unwrap_or_default(),
                },
            });
        }

        let completion: CompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| NarrativeError::InvalidResponse("no choices in response".to_string()))?;

        let analysis = content.trim();
        if analysis.is_empty() {
            return Err(NarrativeError::InvalidResponse(
                "empty completion content".to_string(),
            ));
        }

        Ok(analysis.to_string())
    }
}
