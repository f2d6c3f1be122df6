//! Native multimodal adapter for the Gemini REST API.
//!
//! Text and speech are single `generateContent` calls. Video is a
//! long-running operation created with `predictLongRunning` and then polled
//! by name; [`GeminiVideoSession`] exposes those calls as a
//! [`VideoBackend`] for the job poller.

use crate::env;
use crate::llm::provider::TextProvider;
use crate::llm::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::llm::types::{LLMError, ProviderConfig, SpeechSettings};
use crate::llm::video_job::{FetchedMedia, VideoBackend, VideoJob, VideoRequest};
use futures::future::BoxFuture;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const SPEECH_INSTRUCTION: &str = "Say with a calm and engaging voice: ";
const VIDEO_INSTRUCTION: &str = "An animated, whimsical short film based on this story: ";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiAdapter {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    speech: SpeechSettings,
}

impl GeminiAdapter {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        speech: SpeechSettings,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            speech,
        }
    }

    /// The configured key, else `GEMINI_API_KEY`, else `API_KEY`.
    pub fn resolve_api_key(config: &ProviderConfig) -> Result<String, LLMError> {
        if !config.api_key.trim().is_empty() {
            return Ok(config.api_key.clone());
        }

        [env::vars::GEMINI_API_KEY, env::vars::API_KEY]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.trim().is_empty())
            .ok_or_else(|| LLMError::MissingCredential {
                provider: config.provider.display_name().to_string(),
            })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    async fn send_json(&self, request: HttpRequest) -> Result<Value, LLMError> {
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            warn!("gemini returned status {}", response.status);
            return Err(response.into_api_error());
        }
        response
            .json()
            .map_err(|e| LLMError::MalformedResponse(e.to_string()))
    }

    async fn text(&self, prompt: &str, config: &ProviderConfig) -> Result<String, LLMError> {
        let api_key = Self::resolve_api_key(config)?;
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        let request = HttpRequest::post_json(self.model_url(&config.model, "generateContent"), body)
            .header(API_KEY_HEADER, api_key);

        debug!(
            "Sending generateContent to gemini (model={}, prompt_chars={})",
            config.model,
            prompt.len()
        );
        let data = self.send_json(request).await?;

        let text: String = data
            .pointer("/candidates/0/content/parts")
            .and_then(|p| p.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LLMError::EmptyOrBlockedResponse);
        }
        Ok(text)
    }

    /// Synthesize speech and return the base64 PCM payload.
    ///
    /// The request is abandoned if `cancel` fires while it is in flight.
    pub async fn generate_speech(
        &self,
        text: &str,
        config: &ProviderConfig,
        cancel: &CancellationToken,
    ) -> Result<String, LLMError> {
        if cancel.is_cancelled() {
            return Err(LLMError::Cancelled);
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(LLMError::Cancelled),
            audio = self.speech(text, config) => audio,
        };
        result.map_err(|e| e.with_provider("TTS"))
    }

    async fn speech(&self, text: &str, config: &ProviderConfig) -> Result<String, LLMError> {
        let api_key = Self::resolve_api_key(config)?;
        let body = json!({
            "contents": [{ "parts": [{ "text": format!("{}{}", SPEECH_INSTRUCTION, text) }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": self.speech.voice }
                    }
                }
            }
        });
        let request =
            HttpRequest::post_json(self.model_url(&self.speech.model, "generateContent"), body)
                .header(API_KEY_HEADER, api_key);

        debug!(
            "Requesting speech (model={}, voice={}, text_chars={})",
            self.speech.model,
            self.speech.voice,
            text.len()
        );
        let data = self.send_json(request).await?;

        data.pointer("/candidates/0/content/parts/0/inlineData/data")
            .and_then(|d| d.as_str())
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .ok_or(LLMError::NoAudioData)
    }

    /// Bind a resolved key to this adapter for the lifetime of one video job.
    pub fn video_session(&self, api_key: String) -> GeminiVideoSession<'_> {
        GeminiVideoSession {
            adapter: self,
            api_key,
        }
    }
}

impl TextProvider for GeminiAdapter {
    fn generate_text<'a>(
        &'a self,
        prompt: &'a str,
        config: &'a ProviderConfig,
    ) -> BoxFuture<'a, Result<String, LLMError>> {
        Box::pin(async move {
            self.text(prompt, config)
                .await
                .map_err(|e| e.with_provider(&config.provider.error_prefix()))
        })
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}

pub struct GeminiVideoSession<'a> {
    adapter: &'a GeminiAdapter,
    api_key: String,
}

impl GeminiVideoSession<'_> {
    fn operation_url(&self, name: &str) -> String {
        format!("{}/{}", self.adapter.base_url, name.trim_start_matches('/'))
    }

    fn download_url(&self, uri: &str) -> Result<String, LLMError> {
        let mut url = url::Url::parse(uri)
            .map_err(|e| LLMError::MalformedResponse(format!("invalid video uri: {}", e)))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url.into())
    }
}

/// Read an operation document into a [`VideoJob`].
pub(crate) fn parse_operation(data: &Value) -> Result<VideoJob, LLMError> {
    let operation_handle = data
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| LLMError::MalformedResponse("operation has no name".to_string()))?
        .to_string();

    let result_uri = [
        "/response/generateVideoResponse/generatedSamples/0/video/uri",
        "/response/generatedVideos/0/video/uri",
    ]
    .iter()
    .find_map(|path| data.pointer(path).and_then(|u| u.as_str()))
    .map(str::to_string);

    Ok(VideoJob {
        operation_handle,
        done: data.get("done").and_then(|d| d.as_bool()).unwrap_or(false),
        result_uri,
        error: data
            .pointer("/error/message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
    })
}

impl VideoBackend for GeminiVideoSession<'_> {
    fn create_job<'a>(
        &'a self,
        request: &'a VideoRequest,
    ) -> BoxFuture<'a, Result<VideoJob, LLMError>> {
        Box::pin(async move {
            let body = json!({
                "instances": [{ "prompt": format!("{}{}", VIDEO_INSTRUCTION, request.prompt) }],
                "parameters": {
                    "sampleCount": 1,
                    "resolution": request.resolution,
                    "aspectRatio": request.aspect_ratio,
                }
            });
            let http = HttpRequest::post_json(
                self.adapter.model_url(&request.model, "predictLongRunning"),
                body,
            )
            .header(API_KEY_HEADER, &self.api_key);

            debug!(
                "Creating video job (model={}, resolution={}, aspect_ratio={})",
                request.model, request.resolution, request.aspect_ratio
            );
            let data = self.adapter.send_json(http).await?;
            parse_operation(&data)
        })
    }

    fn poll_job<'a>(&'a self, job: &'a VideoJob) -> BoxFuture<'a, Result<VideoJob, LLMError>> {
        Box::pin(async move {
            let http = HttpRequest::get(self.operation_url(&job.operation_handle))
                .header(API_KEY_HEADER, &self.api_key);
            let data = self.adapter.send_json(http).await?;
            parse_operation(&data)
        })
    }

    fn fetch_media<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<FetchedMedia, LLMError>> {
        Box::pin(async move {
            let response: HttpResponse = self
                .adapter
                .transport
                .send(HttpRequest::get(self.download_url(uri)?))
                .await?;

            if !response.is_success() {
                let status = if response.status_text.is_empty() {
                    response.status.to_string()
                } else {
                    response.status_text.clone()
                };
                return Err(LLMError::VideoFetchFailed(status));
            }

            Ok(FetchedMedia {
                bytes: response.body,
                content_type: response.content_type,
            })
        })
    }
}
