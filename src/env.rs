//! Environment constants and path utilities for promptforge.
//!
//! This module centralizes storage keys, provider endpoints, environment
//! variable names and configuration paths used throughout the application,
//! making them easier to maintain and modify.

use std::path::{Path, PathBuf};

/// Main application directory name (hidden directory like .git, .vscode)
pub const APP_DIR_NAME: &str = ".promptforge";

/// Configuration file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name looked up in the current directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "promptforge.toml";

/// Keys used in the injected key-value store
pub mod storage {
    /// Custom templates collection
    pub const TEMPLATES_KEY: &str = "customPromptTemplates";

    /// Provider configuration collection
    pub const PROVIDER_CONFIGS_KEY: &str = "llmApiProviderConfigs";

    /// Pointer to the active provider configuration
    pub const ACTIVE_CONFIG_KEY: &str = "activeConfigId";

    /// Registered local users
    pub const USERS_KEY: &str = "promptGenUsers";

    /// Currently signed-in user
    pub const CURRENT_USER_KEY: &str = "promptGenCurrentUser";

    /// Default file name of the on-disk store
    pub const STORE_FILE_NAME: &str = "store.json";

    /// Build a key namespaced to a user; guests use the bare key.
    pub fn namespaced(key: &str, user_id: Option<&str>) -> String {
        match user_id {
            Some(id) => format!("{}_{}", key, id),
            None => key.to_string(),
        }
    }
}

/// Provider endpoints and fixed request parameters
pub mod endpoints {
    pub const OPENAI_CHAT_COMPLETIONS: &str = "https://api.openai.com/v1/chat/completions";
    pub const GROK_CHAT_COMPLETIONS: &str = "https://api.x.ai/v1/chat/completions";
    pub const DEEPSEEK_CHAT_COMPLETIONS: &str = "https://api.deepseek.com/v1/chat/completions";
    pub const ANTHROPIC_MESSAGES: &str = "https://api.anthropic.com/v1/messages";
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";
    pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
}

/// Environment variable names
pub mod vars {
    /// Primary fallback key for the native multimodal provider
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

    /// Secondary fallback key for the native multimodal provider
    pub const API_KEY: &str = "API_KEY";

    /// Override for the configuration file path
    pub const CONFIG_PATH: &str = "PROMPTFORGE_CONFIG";
}

/// Test-related constants
pub mod test {
    /// Test user identifier
    pub const TEST_USER_ID: &str = "user-test";
}

/// Build the application directory path from a base directory
pub fn app_dir_path(base: &Path) -> PathBuf {
    base.join(APP_DIR_NAME)
}

/// Build the default store file path from a base directory
pub fn store_file_path(base: &Path) -> PathBuf {
    app_dir_path(base).join(storage::STORE_FILE_NAME)
}

/// Build the default media directory path from a base directory
pub fn media_dir_path(base: &Path) -> PathBuf {
    app_dir_path(base).join("media")
}

/// Build the default audio directory path from a base directory
pub fn audio_dir_path(base: &Path) -> PathBuf {
    app_dir_path(base).join("audio")
}

/// Build config directory path in user's home directory
pub fn user_config_dir_path(home_dir: &Path) -> PathBuf {
    app_dir_path(home_dir)
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    user_config_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build local config file path in current directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    current_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_construction() {
        let base = Path::new("/home/user");

        assert_eq!(app_dir_path(base), Path::new("/home/user/.promptforge"));
        assert_eq!(
            store_file_path(base),
            Path::new("/home/user/.promptforge/store.json")
        );
        assert_eq!(
            media_dir_path(base),
            Path::new("/home/user/.promptforge/media")
        );
        assert_eq!(
            user_config_file_path(base),
            Path::new("/home/user/.promptforge/config.toml")
        );
        assert_eq!(
            local_config_file_path(Path::new("/current/project")),
            Path::new("/current/project/.promptforge/config.toml")
        );
    }

    #[test]
    fn test_namespaced_keys() {
        assert_eq!(
            storage::namespaced(storage::TEMPLATES_KEY, None),
            "customPromptTemplates"
        );
        assert_eq!(
            storage::namespaced(storage::TEMPLATES_KEY, Some("user-42")),
            "customPromptTemplates_user-42"
        );
    }
}
