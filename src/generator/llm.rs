//! Generative model client abstraction and the OpenAI chat-completions
//! implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    Res,
    config::Config,
    error::{Error, Service},
    http::{ApiRequest, HttpTransport},
};

/// Request for a single-message completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    /// 0.0 is deterministic; higher values make repeated calls diverge.
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: 400,
            temperature: 1.0,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    fn model(&self) -> &str;

    /// Sends the prompt and returns the model's raw text answer.
    async fn complete(&self, request: CompletionRequest) -> Res<String>;
}

/// OpenAI chat-completions client. Not rate-limit aware: failures surface
/// immediately.
pub struct OpenAiClient {
    transport: Arc<dyn HttpTransport>,
    api_key: String,
    model: String,
    api_base: String,
}

impl OpenAiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            model: model.into(),
            api_base: crate::config::DEFAULT_OPENAI_API_URL.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn from_config(transport: Arc<dyn HttpTransport>, config: &Config) -> Self {
        Self::new(transport, &config.openai_api_key, &config.openai_model)
            .with_api_base(&config.openai_api_url)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Res<String> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        let body = serde_json::to_value(&body).map_err(|e| Error::Transport {
            service: Service::Generation,
            message: e.to_string(),
        })?;

        let api_request = ApiRequest::post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(body);

        let response = self
            .transport
            .execute(&api_request)
            .await
            .map_err(|e| Error::Transport {
                service: Service::Generation,
                message: e.to_string(),
            })?;
        let json = response.into_json(Service::Generation)?;

        let chat: ChatResponse = serde_json::from_value(json).map_err(|e| Error::Transport {
            service: Service::Generation,
            message: format!("unexpected response shape: {}", e),
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::GenerationParse("model returned no message content".to_string()))
    }
}
