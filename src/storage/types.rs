use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access store at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Store file {path} is not a valid JSON object: {source}")]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize value for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("An account with this email already exists.")]
    EmailTaken,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The signed-in user as seen by the rest of the application.
///
/// Only `id` is used by the core, to namespace persisted collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
}

/// What a guest-data migration moved into a user's namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub templates: usize,
    pub configs: usize,
    pub active_config_moved: bool,
}

impl MigrationReport {
    pub fn is_empty(&self) -> bool {
        self.templates == 0 && self.configs == 0 && !self.active_config_moved
    }
}
