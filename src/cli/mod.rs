//! CLI-specific functionality for promptforge
//!
//! This module contains all CLI-related code including argument parsing,
//! configuration discovery and the command handlers.

pub mod args;
pub mod commands;
pub mod config;

pub use args::{Args, Commands, GenerateCommand, PromptArgs, ProviderCommand, TemplateCommand};
pub use commands::{Workspace, run};
pub use config::{AppConfig, ConfigDiscovery};
