use std::{fmt, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{AiError, AiResult};
use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// LLM backends, tried in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Groq, the primary provider.
    Groq,
    /// OpenAI, the fallback provider.
    OpenAi,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Groq => f.write_str("Groq"),
            Provider::OpenAi => f.write_str("OpenAI"),
        }
    }
}

/// Chat completions over the configured providers.
#[automock]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Whether at least one provider has an API key.
    async fn is_configured(&self) -> bool;

    /// Whether `provider` has an API key.
    async fn has_key(&self, provider: Provider) -> bool;

    /// Replace the API key of `provider`. Kept in memory only.
    async fn set_api_key(&self, provider: Provider, key: String);

    /// Run a single chat completion and return the trimmed answer.
    async fn complete(&self, prompt: &str, system: &str, max_tokens: u32) -> AiResult<String>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

struct Endpoint {
    provider: Provider,
    base_url: String,
    model: String,
    temperature: f32,
    api_key: RwLock<Option<String>>,
}

/// Client for OpenAI compatible chat completion APIs. Groq is tried first and
/// OpenAI is used when Groq has no key or fails.
pub struct OpenAiCompatibleClient {
    client: Client,
    endpoints: [Endpoint; 2],
}

impl OpenAiCompatibleClient {
    /// Creates a client with the endpoints and keys from `config`.
    pub fn new(config: &Config) -> AiResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoints: [
                Endpoint {
                    provider: Provider::Groq,
                    base_url: config.groq_api_url.clone(),
                    model: config.groq_model.clone(),
                    temperature: 0.3,
                    api_key: RwLock::new(config.groq_api_key.clone()),
                },
                Endpoint {
                    provider: Provider::OpenAi,
                    base_url: config.openai_api_url.clone(),
                    model: config.openai_model.clone(),
                    temperature: 0.5,
                    api_key: RwLock::new(config.openai_api_key.clone()),
                },
            ],
        })
    }

    fn endpoint(&self, provider: Provider) -> &Endpoint {
        match provider {
            Provider::Groq => &self.endpoints[0],
            Provider::OpenAi => &self.endpoints[1],
        }
    }

    async fn call(
        &self,
        endpoint: &Endpoint,
        api_key: &str,
        prompt: &str,
        system: &str,
        max_tokens: u32,
    ) -> AiResult<String> {
        let body = ChatCompletionRequest {
            model: &endpoint.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            max_tokens,
            temperature: endpoint.temperature,
        };
        let url = format!("{}/chat/completions", endpoint.base_url.trim_end_matches('/'));
        tracing::debug!("{}: POST {url} model={}", endpoint.provider, endpoint.model);

        let response = self.client.post(&url).bearer_auth(api_key).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::Api { provider: endpoint.provider, status: status.as_u16(), text });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(AiError::EmptyResponse(endpoint.provider))
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn is_configured(&self) -> bool {
        for endpoint in &self.endpoints {
            if endpoint.api_key.read().await.is_some() {
                return true;
            }
        }
        false
    }

    async fn has_key(&self, provider: Provider) -> bool {
        self.endpoint(provider).api_key.read().await.is_some()
    }

    async fn set_api_key(&self, provider: Provider, key: String) {
        let key = key.trim().to_string();
        *self.endpoint(provider).api_key.write().await = (!key.is_empty()).then_some(key);
        tracing::info!("{provider} API key updated");
    }

    async fn complete(&self, prompt: &str, system: &str, max_tokens: u32) -> AiResult<String> {
        let mut last_error = AiError::NotConfigured;

        for endpoint in &self.endpoints {
            let Some(api_key) = endpoint.api_key.read().await.clone() else {
                continue;
            };
            match self.call(endpoint, &api_key, prompt, system, max_tokens).await {
                Ok(answer) => return Ok(answer),
                Err(e) => {
                    tracing::warn!("{} completion failed: {e}", endpoint.provider);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
