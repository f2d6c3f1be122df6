use futures::future::BoxFuture;
use promptforge::llm::{
    DispatcherSettings, HttpRequest, HttpResponse, HttpTransport, LLMError, ProviderDispatcher,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Scripted transport shared by the integration tests.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn with(responses: Vec<HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> HttpRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, LLMError>> {
        self.requests.lock().unwrap().push(request);
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LLMError::Network("no scripted response".to_string()));
        Box::pin(async move { next })
    }
}

#[allow(dead_code)]
pub fn dispatcher(
    transport: Arc<MockTransport>,
    temp_dir: &TempDir,
    poll_interval: Duration,
) -> ProviderDispatcher {
    let settings = DispatcherSettings {
        poll_interval,
        media_dir: temp_dir.path().join("media"),
        ..DispatcherSettings::default()
    };
    ProviderDispatcher::new(transport, settings)
}
