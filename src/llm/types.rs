use crate::env;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

/// Supported provider families.
///
/// Persisted configurations may carry provider names this build does not
/// know about; those deserialize into [`ProviderKind::Unknown`] and are
/// rejected at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderKind {
    /// Google Gemini: chat, speech synthesis and video generation
    Gemini,
    OpenAI,
    Grok,
    DeepSeek,
    Anthropic,
    Unknown(String),
}

/// Media capabilities beyond text, restricted to the native provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Speech,
    Video,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Speech => write!(f, "Speech"),
            Capability::Video => write!(f, "Video"),
        }
    }
}

/// Target provider plus the credentials and model to use with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub id: String,
    pub name: String,
    pub provider: ProviderKind,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
}

/// Recommended model for a provider, as offered in the settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Optional overrides for a video generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoOptions {
    pub aspect_ratio: Option<String>,
    pub resolution: Option<String>,
    pub model: Option<String>,
}

/// Defaults applied to video requests when [`VideoOptions`] leaves a field unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub model: String,
    pub aspect_ratio: String,
    pub resolution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub model: String,
    pub voice: String,
}

/// Base URLs for every provider family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub openai: String,
    pub grok: String,
    pub deepseek: String,
    pub anthropic: String,
    pub gemini_base_url: String,
}

/// Everything the dispatcher needs besides the transport.
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub endpoints: Endpoints,
    pub poll_interval: Duration,
    pub media_dir: PathBuf,
    pub speech: SpeechSettings,
    pub video: VideoSettings,
}

/// A fetched media resource addressable on the local machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaHandle {
    pub path: PathBuf,
    pub uri: String,
    pub content_type: Option<String>,
    pub size_bytes: u64,
}

/// Root classification of an [`LLMError`], independent of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingCredential,
    UnsupportedProvider,
    CapabilityNotSupported,
    MalformedResponse,
    EmptyOrBlockedResponse,
    NoAudioData,
    NoVideoLink,
    VideoFetchFailed,
    Cancelled,
    NetworkError,
    /// The provider answered with a non-success status
    ApiError,
    MediaStorage,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LLMError {
    #[error("API Key not set for the selected provider ({provider}). Please configure it in the settings.")]
    MissingCredential { provider: String },
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
    #[error("{capability} generation is only supported for the Google Gemini provider (got {provider}).")]
    CapabilityNotSupported {
        capability: Capability,
        provider: String,
    },
    #[error("Invalid response structure from the API: {0}")]
    MalformedResponse(String),
    #[error("Invalid response from Gemini API. The response may be empty or blocked.")]
    EmptyOrBlockedResponse,
    #[error("Failed to generate audio. No data received.")]
    NoAudioData,
    #[error("Video generation failed or returned no link.{}", detail_suffix(.0))]
    NoVideoLink(Option<String>),
    #[error("Failed to fetch video data. Status: {0}")]
    VideoFetchFailed(String),
    #[error("Aborted by user")]
    Cancelled,
    #[error("Network error: {0}")]
    Network(String),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Failed to store media: {0}")]
    MediaStorage(String),
    #[error("{prefix} API Error: {source}")]
    Provider {
        prefix: String,
        source: Box<LLMError>,
    },
    #[error("{source} (last status: {last_status})")]
    VideoPipeline {
        last_status: String,
        source: Box<LLMError>,
    },
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|d| format!(" {}", d))
        .unwrap_or_default()
}

impl LLMError {
    /// The root error kind, looking through provider and pipeline wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LLMError::MissingCredential { .. } => ErrorKind::MissingCredential,
            LLMError::UnsupportedProvider(_) => ErrorKind::UnsupportedProvider,
            LLMError::CapabilityNotSupported { .. } => ErrorKind::CapabilityNotSupported,
            LLMError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            LLMError::EmptyOrBlockedResponse => ErrorKind::EmptyOrBlockedResponse,
            LLMError::NoAudioData => ErrorKind::NoAudioData,
            LLMError::NoVideoLink(_) => ErrorKind::NoVideoLink,
            LLMError::VideoFetchFailed(_) => ErrorKind::VideoFetchFailed,
            LLMError::Cancelled => ErrorKind::Cancelled,
            LLMError::Network(_) => ErrorKind::NetworkError,
            LLMError::Api { .. } => ErrorKind::ApiError,
            LLMError::MediaStorage(_) => ErrorKind::MediaStorage,
            LLMError::Provider { source, .. } | LLMError::VideoPipeline { source, .. } => {
                source.kind()
            }
        }
    }

    /// User-initiated stops, which callers should not present as failures.
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }

    /// Qualify the error with a provider prefix. Cancellation passes through untouched.
    pub fn with_provider(self, prefix: &str) -> Self {
        match self {
            LLMError::Cancelled => LLMError::Cancelled,
            other => LLMError::Provider {
                prefix: prefix.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The last progress status a failed video flow reached, if any.
    pub fn last_status(&self) -> Option<&str> {
        match self {
            LLMError::VideoPipeline { last_status, .. } => Some(last_status),
            LLMError::Provider { source, .. } => source.last_status(),
            _ => None,
        }
    }
}

static GEMINI_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^AIzaSy[A-Za-z0-9_-]{33}$").expect("valid gemini key pattern")
});
static OPENAI_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^sk-(proj-)?[A-Za-z0-9]{40,}$").expect("valid openai key pattern")
});
static DEEPSEEK_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^sk-[a-zA-Z0-9]{32,}$").expect("valid deepseek key pattern")
});
static ANTHROPIC_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^sk-ant-[a-zA-Z0-9_-]{80,}$").expect("valid anthropic key pattern")
});

impl ProviderKind {
    /// Every provider this build can route.
    pub const KNOWN: [ProviderKind; 5] = [
        ProviderKind::Gemini,
        ProviderKind::OpenAI,
        ProviderKind::Grok,
        ProviderKind::DeepSeek,
        ProviderKind::Anthropic,
    ];

    /// Identifier used in persisted configurations.
    pub fn as_str(&self) -> &str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Grok => "grok",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Unknown(name) => name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            ProviderKind::Gemini => "Google Gemini",
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::Grok => "Grok",
            ProviderKind::DeepSeek => "DeepSeek",
            ProviderKind::Anthropic => "Anthropic (Claude)",
            ProviderKind::Unknown(name) => name,
        }
    }

    /// Prefix used in provider-qualified error messages.
    pub fn error_prefix(&self) -> String {
        match self {
            ProviderKind::Gemini => "Gemini".to_string(),
            other => other.as_str().to_uppercase(),
        }
    }

    pub fn is_native_multimodal(&self) -> bool {
        matches!(self, ProviderKind::Gemini)
    }

    /// Whether the dispatcher must see a key before any request is made.
    /// The native provider resolves its key itself.
    pub fn requires_api_key(&self) -> bool {
        !self.is_native_multimodal()
    }

    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Gemini => Some("gemini-2.5-flash"),
            ProviderKind::OpenAI => Some("gpt-4-turbo"),
            ProviderKind::Grok => Some("grok-2"),
            ProviderKind::DeepSeek => Some("deepseek-chat"),
            ProviderKind::Anthropic => Some("claude-3-5-sonnet-20240620"),
            ProviderKind::Unknown(_) => None,
        }
    }

    pub fn key_url(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Gemini => Some("https://aistudio.google.com/app/apikey"),
            ProviderKind::OpenAI => Some("https://platform.openai.com/api-keys"),
            ProviderKind::Grok => Some("https://x.ai/"),
            ProviderKind::DeepSeek => Some("https://platform.deepseek.com/api_keys"),
            ProviderKind::Anthropic => Some("https://console.anthropic.com/settings/keys"),
            ProviderKind::Unknown(_) => None,
        }
    }

    pub fn recommended_models(&self) -> &'static [ModelOption] {
        const fn m(value: &'static str, label: &'static str) -> ModelOption {
            ModelOption { value, label }
        }
        const GEMINI: &[ModelOption] = &[
            m("gemini-2.5-flash", "Gemini 2.5 Flash (Fast & Balanced)"),
            m("gemini-3-pro-preview", "Gemini 3.0 Pro (Best for Coding & Reasoning)"),
            m("gemini-2.0-pro-exp-02-05", "Gemini 2.0 Pro Exp (Complex Tasks)"),
            m("gemini-2.5-flash-thinking", "Gemini 2.5 Flash Thinking (Enhanced Reasoning)"),
            m("gemini-flash-lite-latest", "Gemini Flash Lite (Cost Effective)"),
        ];
        const OPENAI: &[ModelOption] = &[
            m("gpt-4.5-preview", "GPT-4.5 Preview (New Flagship)"),
            m("gpt-4o", "GPT-4o (Fast & Intelligent)"),
            m("gpt-4-turbo", "GPT-4 Turbo"),
            m("o1-preview", "o1 Preview (Advanced Reasoning)"),
            m("o1-mini", "o1 Mini (Fast Reasoning)"),
            m("o3-mini", "o3 Mini (Latest Reasoning)"),
        ];
        const GROK: &[ModelOption] = &[m("grok-2", "Grok-2"), m("grok-1", "Grok-1")];
        const DEEPSEEK: &[ModelOption] = &[
            m("deepseek-chat", "DeepSeek Chat (V3)"),
            m("deepseek-reasoner", "DeepSeek R1 (Reasoning & Coding)"),
        ];
        const ANTHROPIC: &[ModelOption] = &[
            m("claude-3-5-sonnet-20240620", "Claude 3.5 Sonnet"),
            m("claude-3-opus-20240229", "Claude 3 Opus"),
            m("claude-3-haiku-20240307", "Claude 3 Haiku"),
        ];

        match self {
            ProviderKind::Gemini => GEMINI,
            ProviderKind::OpenAI => OPENAI,
            ProviderKind::Grok => GROK,
            ProviderKind::DeepSeek => DEEPSEEK,
            ProviderKind::Anthropic => ANTHROPIC,
            ProviderKind::Unknown(_) => &[],
        }
    }

    /// Check a key against the provider's documented format.
    ///
    /// Returns a human-readable reason when the key looks wrong. Providers
    /// without a known format only require a non-empty key.
    pub fn validate_api_key(&self, key: &str) -> Result<(), String> {
        if key.trim().is_empty() {
            return Err("API Key is required.".to_string());
        }

        let check = match self {
            ProviderKind::Gemini => Some((
                &*GEMINI_KEY,
                "Invalid Gemini API key format. It should start with \"AIzaSy\" and be 39 characters long.",
            )),
            ProviderKind::OpenAI => Some((
                &*OPENAI_KEY,
                "Invalid OpenAI API key format. It should start with \"sk-\".",
            )),
            ProviderKind::DeepSeek => Some((
                &*DEEPSEEK_KEY,
                "Invalid DeepSeek API key format. It should start with \"sk-\".",
            )),
            ProviderKind::Anthropic => Some((
                &*ANTHROPIC_KEY,
                "Invalid Anthropic API key format. It should start with \"sk-ant-\".",
            )),
            ProviderKind::Grok | ProviderKind::Unknown(_) => None,
        };

        match check {
            Some((pattern, message)) if !pattern.is_match(key) => Err(message.to_string()),
            _ => Ok(()),
        }
    }
}

impl From<String> for ProviderKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "gemini" => ProviderKind::Gemini,
            "openai" => ProviderKind::OpenAI,
            "grok" => ProviderKind::Grok,
            "deepseek" => ProviderKind::DeepSeek,
            "anthropic" => ProviderKind::Anthropic,
            _ => ProviderKind::Unknown(value),
        }
    }
}

impl From<ProviderKind> for String {
    fn from(kind: ProviderKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ProviderKind::from(s.to_lowercase()))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ProviderConfig {
    /// New configuration with a generated id and the provider's default model.
    pub fn new(provider: ProviderKind, api_key: impl Into<String>) -> Self {
        let model = provider.default_model().unwrap_or_default().to_string();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: provider.display_name().to_string(),
            provider,
            api_key: api_key.into(),
            model,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            model: "veo-3.1-fast-generate-preview".to_string(),
            aspect_ratio: "16:9".to_string(),
            resolution: "720p".to_string(),
        }
    }
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-preview-tts".to_string(),
            voice: "Kore".to_string(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            openai: env::endpoints::OPENAI_CHAT_COMPLETIONS.to_string(),
            grok: env::endpoints::GROK_CHAT_COMPLETIONS.to_string(),
            deepseek: env::endpoints::DEEPSEEK_CHAT_COMPLETIONS.to_string(),
            anthropic: env::endpoints::ANTHROPIC_MESSAGES.to_string(),
            gemini_base_url: env::endpoints::GEMINI_BASE_URL.to_string(),
        }
    }
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            poll_interval: Duration::from_secs(10),
            media_dir: std::env::temp_dir().join("promptforge-media"),
            speech: SpeechSettings::default(),
            video: VideoSettings::default(),
        }
    }
}
