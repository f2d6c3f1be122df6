//! Long-running video generation jobs.
//!
//! A job moves `Created -> Polling -> {Completed, Failed, Cancelled}`.
//! Cancellation is cooperative: it is checked before the job is created, at
//! the top of every poll iteration and while waiting between polls. Job
//! creation and status requests are never interrupted once sent; only the
//! final media download is aborted in flight.

use crate::llm::media::MediaStore;
use crate::llm::types::{LLMError, MediaHandle};
use futures::future::BoxFuture;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const STATUS_INITIALIZING: &str = "Initializing video generation...";
pub const STATUS_IN_PROGRESS: &str = "Generation in progress... This may take a few minutes.";
pub const STATUS_CHECKING: &str = "Checking progress...";
pub const STATUS_FETCHING: &str = "Fetching video...";
pub const STATUS_READY: &str = "Video ready!";

/// Reported when a flow fails before emitting any status.
const STATUS_STARTING: &str = "Starting...";

/// One-way progress hook. It is invoked synchronously and never awaited.
pub type ProgressFn = dyn Fn(&str) + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoJobState {
    Created,
    Polling,
    Completed,
    Failed,
    Cancelled,
}

/// Provider-side view of a video operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoJob {
    /// Opaque, provider-defined operation name
    pub operation_handle: String,
    pub done: bool,
    pub result_uri: Option<String>,
    /// Failure reported by the provider for a finished job
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRequest {
    pub model: String,
    pub prompt: String,
    pub aspect_ratio: String,
    pub resolution: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// The provider operations a video job needs.
pub trait VideoBackend: Send + Sync {
    fn create_job<'a>(
        &'a self,
        request: &'a VideoRequest,
    ) -> BoxFuture<'a, Result<VideoJob, LLMError>>;

    fn poll_job<'a>(&'a self, job: &'a VideoJob) -> BoxFuture<'a, Result<VideoJob, LLMError>>;

    fn fetch_media<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<FetchedMedia, LLMError>>;
}

impl VideoJob {
    pub fn state(&self) -> VideoJobState {
        match (self.done, &self.result_uri) {
            (false, _) => VideoJobState::Polling,
            (true, Some(_)) => VideoJobState::Completed,
            (true, None) => VideoJobState::Failed,
        }
    }
}

/// Remembers the last emitted status so failures can report where they happened.
struct ProgressTracker<'a> {
    on_progress: &'a ProgressFn,
    last: Option<&'static str>,
}

impl<'a> ProgressTracker<'a> {
    fn emit(&mut self, status: &'static str) {
        self.last = Some(status);
        (self.on_progress)(status);
    }
}

/// Drives a [`VideoBackend`] job from creation to a stored media file.
pub struct VideoJobPoller<'a> {
    backend: &'a dyn VideoBackend,
    media: &'a MediaStore,
    poll_interval: Duration,
}

impl<'a> VideoJobPoller<'a> {
    pub fn new(
        backend: &'a dyn VideoBackend,
        media: &'a MediaStore,
        poll_interval: Duration,
    ) -> Self {
        Self {
            backend,
            media,
            poll_interval,
        }
    }

    /// Run the job to completion.
    ///
    /// Failures other than cancellation are wrapped in
    /// [`LLMError::VideoPipeline`] carrying the last emitted status.
    pub async fn run(
        &self,
        request: &VideoRequest,
        on_progress: &ProgressFn,
        cancel: &CancellationToken,
    ) -> Result<MediaHandle, LLMError> {
        let mut progress = ProgressTracker {
            on_progress,
            last: None,
        };

        match self.drive(request, &mut progress, cancel).await {
            Ok(handle) => Ok(handle),
            Err(LLMError::Cancelled) => {
                info!("Video generation cancelled ({})", progress.last.unwrap_or(STATUS_STARTING));
                Err(LLMError::Cancelled)
            }
            Err(error) => Err(LLMError::VideoPipeline {
                last_status: progress.last.unwrap_or(STATUS_STARTING).to_string(),
                source: Box::new(error),
            }),
        }
    }

    async fn drive(
        &self,
        request: &VideoRequest,
        progress: &mut ProgressTracker<'_>,
        cancel: &CancellationToken,
    ) -> Result<MediaHandle, LLMError> {
        if cancel.is_cancelled() {
            return Err(LLMError::Cancelled);
        }

        progress.emit(STATUS_INITIALIZING);
        let mut job = self.backend.create_job(request).await?;
        debug!("Video job {} -> {:?}", job.operation_handle, VideoJobState::Created);
        progress.emit(STATUS_IN_PROGRESS);

        let mut polls = 0u32;
        while !job.done {
            if cancel.is_cancelled() {
                debug!("Video job {} -> {:?}", job.operation_handle, VideoJobState::Cancelled);
                return Err(LLMError::Cancelled);
            }
            tokio::select! {
                _ = cancel.cancelled() => return Err(LLMError::Cancelled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            progress.emit(STATUS_CHECKING);
            job = self.backend.poll_job(&job).await?;
            polls += 1;
            debug!(
                "Video job {} poll #{} -> {:?}",
                job.operation_handle,
                polls,
                job.state()
            );
        }

        let uri = match (&job.result_uri, job.state()) {
            (Some(uri), VideoJobState::Completed) => uri.clone(),
            _ => return Err(LLMError::NoVideoLink(job.error.clone())),
        };

        progress.emit(STATUS_FETCHING);
        let media = tokio::select! {
            _ = cancel.cancelled() => return Err(LLMError::Cancelled),
            fetched = self.backend.fetch_media(&uri) => fetched?,
        };

        let handle = self
            .media
            .store(&media.bytes, media.content_type.as_deref())
            .await?;
        progress.emit(STATUS_READY);
        info!("Video job {} completed after {} polls", job.operation_handle, polls);
        Ok(handle)
    }
}
