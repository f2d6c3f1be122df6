pub mod anthropic;
pub mod chat_completions;
pub mod dispatcher;
pub mod gemini;
pub mod media;
pub mod provider;
pub mod transport;
pub mod types;
pub mod video_job;

pub use anthropic::AnthropicAdapter;
pub use chat_completions::ChatCompletionsAdapter;
pub use dispatcher::ProviderDispatcher;
pub use gemini::GeminiAdapter;
pub use media::MediaStore;
pub use provider::TextProvider;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use types::*;
pub use video_job::{
    FetchedMedia, ProgressFn, VideoBackend, VideoJob, VideoJobPoller, VideoJobState,
    VideoRequest,
};
