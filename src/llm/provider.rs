use crate::llm::types::{LLMError, ProviderConfig};
use futures::future::BoxFuture;

/// Text generation contract shared by every protocol adapter.
pub trait TextProvider: Send + Sync {
    /// Send `prompt` to the provider described by `config` and return the reply text.
    ///
    /// Errors come back already qualified with the provider prefix
    /// (`"{PROVIDER} API Error: ..."`).
    fn generate_text<'a>(
        &'a self,
        prompt: &'a str,
        config: &'a ProviderConfig,
    ) -> BoxFuture<'a, Result<String, LLMError>>;

    /// Get provider name/identifier
    fn provider_name(&self) -> &str;
}
