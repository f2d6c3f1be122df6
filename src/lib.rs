//! # Promptforge
//!
//! Template-based prompt assembly and a multi-provider dispatcher for text,
//! speech and video generation.
//!
//! ## Architecture Overview
//!
//! - **[`template`]**: Prompt templates, the built-in catalogue and in-memory CRUD
//! - **[`prompt`]**: User inputs and deterministic prompt assembly
//! - **[`llm`]**: Provider configurations, adapters, video job polling and the dispatcher
//! - **[`audio`]**: Decoding of synthesized speech into WAV files
//! - **[`storage`]**: Key-value persistence, user namespacing and local identities
//! - **[`cli`]**: Argument parsing, configuration discovery and command handlers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use promptforge::llm::{DispatcherSettings, ProviderConfig, ProviderKind, ReqwestTransport};
//! use promptforge::{ProviderDispatcher, PromptInputs, assemble_prompt, builtin_templates};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let template = builtin_templates().remove(0);
//!     let inputs = PromptInputs::for_template(&template).with("TOPIC", "Rust lifetimes");
//!     let prompt = assemble_prompt(&inputs, &template);
//!
//!     let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(120))?);
//!     let dispatcher = ProviderDispatcher::new(transport, DispatcherSettings::default());
//!     let config = ProviderConfig::new(ProviderKind::OpenAI, "sk-...");
//!
//!     println!("{}", dispatcher.generate_text(&prompt, &config).await?);
//!     Ok(())
//! }
//! ```

/// Prompt templates and the template catalogue.
pub mod template;

/// Prompt inputs and assembly.
pub mod prompt;

/// Provider-agnostic generation interface.
///
/// Routes text requests to chat-completions style providers and media
/// requests (speech, video) to the native multimodal provider.
pub mod llm;

/// Speech payload decoding and WAV rendering.
pub mod audio;

/// Persistence of templates, provider configurations and users.
pub mod storage;

/// Environment constants and path utilities.
///
/// Centralizes storage keys, endpoint URLs and directory names used
/// throughout the application.
pub mod env;

// CLI module for command-line interface
pub mod cli;

pub use llm::{LLMError, MediaHandle, ProviderConfig, ProviderDispatcher, ProviderKind};
pub use prompt::{PromptInputs, assemble_prompt};
pub use template::{Template, TemplateVariable, builtin_templates};
