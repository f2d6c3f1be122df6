//! Adapter for the Anthropic Messages API.

use crate::env;
use crate::llm::provider::TextProvider;
use crate::llm::transport::{HttpRequest, HttpTransport};
use crate::llm::types::{LLMError, ProviderConfig};
use futures::future::BoxFuture;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

pub struct AnthropicAdapter {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
}

impl AnthropicAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    async fn complete(&self, prompt: &str, config: &ProviderConfig) -> Result<String, LLMError> {
        let body = serde_json::to_value(MessagesRequest {
            model: &config.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        })
        .map_err(|e| LLMError::MalformedResponse(format!("Failed to encode request: {}", e)))?;

        let request = HttpRequest::post_json(&self.endpoint, body)
            .header("x-api-key", &config.api_key)
            .header("anthropic-version", env::endpoints::ANTHROPIC_VERSION);

        debug!(
            "Sending message to anthropic (model={}, prompt_chars={})",
            config.model,
            prompt.len()
        );
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            warn!("anthropic returned status {}", response.status);
            return Err(response.into_api_error());
        }

        let data = response
            .json()
            .map_err(|e| LLMError::MalformedResponse(e.to_string()))?;

        let text: String = data
            .get("content")
            .and_then(|c| c.as_array())
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
                    .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
                    .collect()
            })
            .ok_or_else(|| LLMError::MalformedResponse("missing content blocks".to_string()))?;

        if text.is_empty() {
            return Err(LLMError::MalformedResponse(
                "no text content in response".to_string(),
            ));
        }
        Ok(text)
    }
}

impl TextProvider for AnthropicAdapter {
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
        "anthropic"
    }
}
