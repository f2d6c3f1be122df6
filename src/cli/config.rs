//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. `--config` flag or `PROMPTFORGE_CONFIG`
//! 2. Current directory: ./promptforge.toml or ./.promptforge/config.toml
//! 3. User config: ~/.promptforge/config.toml
//! 4. System config: /etc/promptforge/config.toml
//! 5. Built-in defaults

use crate::env;
use crate::llm::{DispatcherSettings, Endpoints, SpeechSettings, VideoSettings};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_LOG_FILTER: &str = "promptforge=info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the store file; defaults to ~/.promptforge
    pub storage_dir: Option<PathBuf>,
    pub media_dir: Option<PathBuf>,
    pub audio_dir: Option<PathBuf>,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub log_filter: Option<String>,
    pub openai_endpoint: Option<String>,
    pub grok_endpoint: Option<String>,
    pub deepseek_endpoint: Option<String>,
    pub anthropic_endpoint: Option<String>,
    pub gemini_base_url: Option<String>,
    pub video: VideoSettings,
    pub speech: SpeechSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            media_dir: None,
            audio_dir: None,
            poll_interval_secs: 10,
            request_timeout_secs: 120,
            log_filter: None,
            openai_endpoint: None,
            grok_endpoint: None,
            deepseek_endpoint: None,
            anthropic_endpoint: None,
            gemini_base_url: None,
            video: VideoSettings::default(),
            speech: SpeechSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save to TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file {}", path.as_ref().display()))
    }

    fn base_dir() -> PathBuf {
        ConfigDiscovery::get_home_dir()
            .or_else(|| std_env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn store_path(&self) -> PathBuf {
        match &self.storage_dir {
            Some(dir) => dir.join(env::storage::STORE_FILE_NAME),
            None => env::store_file_path(&Self::base_dir()),
        }
    }

    pub fn media_path(&self) -> PathBuf {
        match (&self.media_dir, &self.storage_dir) {
            (Some(dir), _) => dir.clone(),
            (None, Some(storage)) => storage.join("media"),
            (None, None) => env::media_dir_path(&Self::base_dir()),
        }
    }

    pub fn audio_path(&self) -> PathBuf {
        match (&self.audio_dir, &self.storage_dir) {
            (Some(dir), _) => dir.clone(),
            (None, Some(storage)) => storage.join("audio"),
            (None, None) => env::audio_dir_path(&Self::base_dir()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        let pick = |value: &Option<String>, default: String| value.clone().unwrap_or(default);
        Endpoints {
            openai: pick(&self.openai_endpoint, defaults.openai),
            grok: pick(&self.grok_endpoint, defaults.grok),
            deepseek: pick(&self.deepseek_endpoint, defaults.deepseek),
            anthropic: pick(&self.anthropic_endpoint, defaults.anthropic),
            gemini_base_url: pick(&self.gemini_base_url, defaults.gemini_base_url),
        }
    }

    pub fn dispatcher_settings(&self) -> DispatcherSettings {
        DispatcherSettings {
            endpoints: self.endpoints(),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            media_dir: self.media_path(),
            speech: self.speech.clone(),
            video: self.video.clone(),
        }
    }
}

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Load the explicit file if given, else discover one, else use defaults
    pub fn load(config_override: Option<&Path>) -> Result<AppConfig> {
        if let Some(path) = config_override {
            info!("Loading configuration override from: {:?}", path);
            return AppConfig::from_toml_file(path);
        }
        if let Ok(path) = std_env::var(env::vars::CONFIG_PATH) {
            info!("Loading configuration from ${}: {}", env::vars::CONFIG_PATH, path);
            return AppConfig::from_toml_file(path);
        }
        Self::discover_config()
    }

    /// Discover and load configuration using the hierarchy
    pub fn discover_config() -> Result<AppConfig> {
        if let Some(config_path) = Self::find_config_file() {
            info!("Loading configuration from: {:?}", config_path);
            return AppConfig::from_toml_file(config_path);
        }

        debug!("No configuration file found, using defaults");
        Ok(AppConfig::default())
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        for candidate in Self::get_config_candidates() {
            debug!("Checking for config file: {:?}", candidate);
            if candidate.is_file() {
                debug!("Found config file: {:?}", candidate);
                return Some(candidate);
            }
        }

        debug!("No config file found in discovery hierarchy");
        None
    }

    fn get_config_candidates() -> Vec<PathBuf> {
        Self::candidates_for(
            std_env::current_dir().ok().as_deref(),
            Self::get_home_dir().as_deref(),
        )
    }

    /// Configuration file candidates in priority order
    fn candidates_for(current_dir: Option<&Path>, home_dir: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Some(current_dir) = current_dir {
            candidates.push(current_dir.join(env::LOCAL_CONFIG_FILE_NAME));
            candidates.push(env::local_config_file_path(current_dir));
        }

        if let Some(home_dir) = home_dir {
            candidates.push(env::user_config_file_path(home_dir));
        }

        #[cfg(unix)]
        candidates.push(PathBuf::from("/etc/promptforge/config.toml"));

        #[cfg(windows)]
        if let Ok(program_data) = std_env::var("PROGRAMDATA") {
            candidates.push(
                PathBuf::from(program_data)
                    .join("promptforge")
                    .join(env::CONFIG_FILE_NAME),
            );
        }

        candidates
    }

    /// Get home directory path
    fn get_home_dir() -> Option<PathBuf> {
        std_env::var("HOME")
            .ok()
            .or_else(|| std_env::var("USERPROFILE").ok())
            .map(PathBuf::from)
    }

    /// Show configuration discovery information for debugging
    pub fn show_discovery_info(config: &AppConfig) {
        println!("Configuration Discovery Hierarchy:");
        println!();

        for (i, candidate) in Self::get_config_candidates().iter().enumerate() {
            let status = if candidate.exists() {
                if candidate.is_file() {
                    "✓ EXISTS"
                } else {
                    "✗ NOT A FILE"
                }
            } else {
                "✗ NOT FOUND"
            };

            println!("  {}. {:?} - {}", i + 1, candidate, status);
        }

        println!();
        match Self::find_config_file() {
            Some(found) => println!("Active configuration: {:?}", found),
            None => println!("Active configuration: Built-in defaults"),
        }

        println!();
        println!("Store:         {}", config.store_path().display());
        println!("Media:         {}", config.media_path().display());
        println!("Audio:         {}", config.audio_path().display());
        println!("Poll interval: {}s", config.poll_interval_secs);
        println!("Log filter:    {}", config.log_filter());
    }
}
