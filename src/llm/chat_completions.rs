//! Adapter for chat-completions style APIs (OpenAI, Grok, DeepSeek).
//!
//! One adapter instance serves one provider family; only the endpoint URL
//! and the error prefix differ between them.

use crate::llm::provider::TextProvider;
use crate::llm::transport::{HttpRequest, HttpTransport};
use crate::llm::types::{LLMError, ProviderConfig};
use futures::future::BoxFuture;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

pub struct ChatCompletionsAdapter {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
    name: String,
}

impl ChatCompletionsAdapter {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        endpoint: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            name: name.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request(
        &self,
        prompt: &str,
        config: &ProviderConfig,
    ) -> Result<HttpRequest, LLMError> {
        let body = ChatRequest {
            model: &config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| LLMError::MalformedResponse(format!("Failed to encode request: {}", e)))?;

        Ok(HttpRequest::post_json(&self.endpoint, body).bearer(&config.api_key))
    }

    async fn complete(&self, prompt: &str, config: &ProviderConfig) -> Result<String, LLMError> {
        let request = self.build_request(prompt, config)?;
        debug!(
            "Sending chat completion to {} (model={}, prompt_chars={})",
            self.name,
            config.model,
            prompt.len()
        );

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            warn!("{} returned status {}", self.name, response.status);
            return Err(response.into_api_error());
        }

        let data = response
            .json()
            .map_err(|e| LLMError::MalformedResponse(e.to_string()))?;

        data.pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                LLMError::MalformedResponse("missing choices[0].message.content".to_string())
            })
    }
}

impl TextProvider for ChatCompletionsAdapter {
    fn generate_text<'a>(
        &'a self,
        prompt: &'a str,
        config: &'a ProviderConfig,
    ) -> BoxFuture<'a, Result<String, LLMError>> {
        Box::pin(async move {
            self.complete(prompt, config)
                .await
                .map_err(|e| e.with_provider(&config.provider.error_prefix()))
        })
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}
