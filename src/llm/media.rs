use crate::llm::types::{LLMError, MediaHandle};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

/// Writes fetched media to a directory and hands back local handles.
///
/// Files live until their handle is passed to [`MediaStore::remove`]; the
/// store never deletes anything on its own.
#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn store(
        &self,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<MediaHandle, LLMError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| LLMError::MediaStorage(format!("{}: {}", self.dir.display(), e)))?;

        let path = self.dir.join(format!(
            "video-{}.{}",
            Uuid::new_v4(),
            extension_for(content_type)
        ));
        fs::write(&path, bytes)
            .await
            .map_err(|e| LLMError::MediaStorage(format!("{}: {}", path.display(), e)))?;

        let canonical = fs::canonicalize(&path).await;
        let path = canonical.unwrap_or(path);
        let uri = url::Url::from_file_path(&path)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("file://{}", path.display()));

        info!("Stored {} bytes of media at {}", bytes.len(), path.display());
        Ok(MediaHandle {
            path,
            uri,
            content_type: content_type.map(str::to_string),
            size_bytes: bytes.len() as u64,
        })
    }

    /// Delete the file behind `handle`. Returns `false` when it was already gone.
    ///
    /// Only files inside this store's directory are removed.
    pub async fn remove(&self, handle: &MediaHandle) -> Result<bool, LLMError> {
        let storage_err =
            |e: std::io::Error| LLMError::MediaStorage(format!("{}: {}", handle.path.display(), e));

        let dir = match fs::canonicalize(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(storage_err(e)),
        };
        let path = match fs::canonicalize(&handle.path).await {
            Ok(path) => path,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(storage_err(e)),
        };
        if path.parent() != Some(dir.as_path()) {
            return Err(LLMError::MediaStorage(format!(
                "{} is not managed by the media store at {}",
                handle.path.display(),
                self.dir.display()
            )));
        }

        fs::remove_file(&path).await.map_err(storage_err)?;
        debug!("Removed media {}", path.display());
        Ok(true)
    }
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    let essence = content_type
        .and_then(|c| c.split(';').next())
        .map(str::trim)
        .unwrap_or_default();
    match essence {
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        "audio/wav" | "audio/x-wav" => "wav",
        _ => "mp4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_writes_file_and_builds_uri() {
        let temp_dir = TempDir::new().unwrap();
        let store = MediaStore::new(temp_dir.path().join("media"));

        let handle = store.store(b"fake-mp4", Some("video/mp4")).await.unwrap();

        assert!(handle.path.exists());
        assert_eq!(handle.size_bytes, 8);
        assert!(handle.uri.starts_with("file://"));
        assert!(handle.uri.ends_with(".mp4"));
        assert_eq!(tokio::fs::read(&handle.path).await.unwrap(), b"fake-mp4");
    }

    #[tokio::test]
    async fn test_remove_releases_stored_media() {
        let temp_dir = TempDir::new().unwrap();
        let store = MediaStore::new(temp_dir.path().join("media"));
        let handle = store.store(b"bytes", None).await.unwrap();

        assert!(store.remove(&handle).await.unwrap());
        assert!(!handle.path.exists());
        assert!(!store.remove(&handle).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_refuses_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = MediaStore::new(temp_dir.path().join("media"));
        store.store(b"bytes", None).await.unwrap();

        let outside = temp_dir.path().join("keep.mp4");
        std::fs::write(&outside, b"keep").unwrap();
        let foreign = MediaHandle {
            path: outside.clone(),
            uri: String::new(),
            content_type: None,
            size_bytes: 4,
        };

        assert!(matches!(store.remove(&foreign).await, Err(LLMError::MediaStorage(_))));
        assert!(outside.exists());
    }

    #[test]
    fn test_extension_for_content_type() {
        assert_eq!(extension_for(Some("video/webm; codecs=vp9")), "webm");
        assert_eq!(extension_for(Some("application/octet-stream")), "mp4");
        assert_eq!(extension_for(None), "mp4");
    }
}
