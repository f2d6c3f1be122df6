//! Uniform entry point over every provider family.

use crate::llm::anthropic::AnthropicAdapter;
use crate::llm::chat_completions::ChatCompletionsAdapter;
use crate::llm::gemini::GeminiAdapter;
use crate::llm::media::MediaStore;
use crate::llm::provider::TextProvider;
use crate::llm::transport::HttpTransport;
use crate::llm::types::{
    Capability, DispatcherSettings, LLMError, MediaHandle, ProviderConfig, ProviderKind,
    VideoOptions,
};
use crate::llm::video_job::{ProgressFn, VideoJobPoller, VideoRequest};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Routes generation requests to the adapter matching `config.provider`.
///
/// Holds only read-only state, so independent requests may run concurrently
/// against one dispatcher.
pub struct ProviderDispatcher {
    gemini: GeminiAdapter,
    openai: ChatCompletionsAdapter,
    grok: ChatCompletionsAdapter,
    deepseek: ChatCompletionsAdapter,
    anthropic: AnthropicAdapter,
    media: MediaStore,
    settings: DispatcherSettings,
}

impl ProviderDispatcher {
    pub fn new(transport: Arc<dyn HttpTransport>, settings: DispatcherSettings) -> Self {
        let endpoints = &settings.endpoints;
        Self {
            gemini: GeminiAdapter::new(
                transport.clone(),
                &endpoints.gemini_base_url,
                settings.speech.clone(),
            ),
            openai: ChatCompletionsAdapter::new(transport.clone(), &endpoints.openai, "openai"),
            grok: ChatCompletionsAdapter::new(transport.clone(), &endpoints.grok, "grok"),
            deepseek: ChatCompletionsAdapter::new(
                transport.clone(),
                &endpoints.deepseek,
                "deepseek",
            ),
            anthropic: AnthropicAdapter::new(transport, &endpoints.anthropic),
            media: MediaStore::new(&settings.media_dir),
            settings,
        }
    }

    pub fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }

    /// Store holding fetched videos; callers release handles they are done with.
    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    fn text_provider(&self, kind: &ProviderKind) -> Result<&dyn TextProvider, LLMError> {
        match kind {
            ProviderKind::Gemini => Ok(&self.gemini),
            ProviderKind::OpenAI => Ok(&self.openai),
            ProviderKind::Grok => Ok(&self.grok),
            ProviderKind::DeepSeek => Ok(&self.deepseek),
            ProviderKind::Anthropic => Ok(&self.anthropic),
            ProviderKind::Unknown(name) => Err(LLMError::UnsupportedProvider(name.clone())),
        }
    }

    fn require_native(config: &ProviderConfig, capability: Capability) -> Result<(), LLMError> {
        if config.provider.is_native_multimodal() {
            Ok(())
        } else {
            Err(LLMError::CapabilityNotSupported {
                capability,
                provider: config.provider.as_str().to_string(),
            })
        }
    }

    pub async fn generate_text(
        &self,
        prompt: &str,
        config: &ProviderConfig,
    ) -> Result<String, LLMError> {
        if config.provider.requires_api_key() && config.api_key.trim().is_empty() {
            return Err(LLMError::MissingCredential {
                provider: config.provider.display_name().to_string(),
            });
        }

        let provider = self.text_provider(&config.provider)?;
        debug!("Dispatching text request to {} ({})", provider.provider_name(), config.model);
        let text = provider.generate_text(prompt, config).await?;
        info!("Generated {} chars of text via {}", text.len(), config.provider);
        Ok(text)
    }

    /// Returns the base64 PCM payload (16-bit, 24 kHz, mono).
    pub async fn generate_speech(
        &self,
        text: &str,
        config: &ProviderConfig,
        cancel: Option<&CancellationToken>,
    ) -> Result<String, LLMError> {
        Self::require_native(config, Capability::Speech)?;
        let fallback = CancellationToken::new();
        let cancel = cancel.unwrap_or(&fallback);

        self.gemini.generate_speech(text, config, cancel).await
    }

    pub async fn generate_video(
        &self,
        prompt: &str,
        config: &ProviderConfig,
        on_progress: &ProgressFn,
        cancel: Option<&CancellationToken>,
        options: VideoOptions,
    ) -> Result<MediaHandle, LLMError> {
        Self::require_native(config, Capability::Video)?;
        let fallback = CancellationToken::new();
        let cancel = cancel.unwrap_or(&fallback);
        if cancel.is_cancelled() {
            return Err(LLMError::Cancelled);
        }

        let api_key = GeminiAdapter::resolve_api_key(config).map_err(|e| e.with_provider("Video"))?;
        let defaults = &self.settings.video;
        let request = VideoRequest {
            model: options.model.unwrap_or_else(|| defaults.model.clone()),
            prompt: prompt.to_string(),
            aspect_ratio: options
                .aspect_ratio
                .unwrap_or_else(|| defaults.aspect_ratio.clone()),
            resolution: options
                .resolution
                .unwrap_or_else(|| defaults.resolution.clone()),
        };

        info!(
            "Starting video generation (model={}, resolution={}, aspect_ratio={})",
            request.model, request.resolution, request.aspect_ratio
        );
        let session = self.gemini.video_session(api_key);
        VideoJobPoller::new(&session, &self.media, self.settings.poll_interval)
            .run(&request, on_progress, cancel)
            .await
            .map_err(|e| e.with_provider("Video"))
    }
}
