//! Command line argument parsing
//!
//! Subcommands:
//! - `templates`: list, show, create, delete and reorder templates
//! - `assemble`: print the prompt built from a template and inputs
//! - `generate`: send a prompt to the active provider (text, speech, video)
//! - `providers`: manage provider configurations
//! - `login` / `register` / `logout` / `whoami`: local accounts
//! - `show-config`: show configuration discovery information

use crate::template::{SortKey, SortOrder};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "promptforge")]
#[command(author = "Promptforge Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build structured prompts from templates and send them to LLM providers")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage prompt templates
    Templates {
        #[command(subcommand)]
        action: TemplateCommand,
    },
    /// Print the prompt assembled from a template and inputs
    Assemble(PromptArgs),
    /// Generate content with the active provider
    Generate {
        #[command(subcommand)]
        action: GenerateCommand,
    },
    /// Manage provider configurations
    Providers {
        #[command(subcommand)]
        action: ProviderCommand,
    },
    /// Sign in to a local account
    Login {
        email: String,
        #[arg(long = "password")]
        password: String,
        /// Move guest templates and providers into the account
        #[arg(long = "migrate-guest-data")]
        migrate: bool,
    },
    /// Create a local account and sign in
    Register {
        email: String,
        #[arg(long = "password")]
        password: String,
        /// Move guest templates and providers into the account
        #[arg(long = "migrate-guest-data")]
        migrate: bool,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show configuration discovery information
    ShowConfig,
}

#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    /// List templates grouped by category
    List {
        /// Only templates whose name or description contains this text
        #[arg(short = 's', long = "search")]
        search: Option<String>,
        #[arg(long = "sort", value_enum, default_value_t = SortArg::Category)]
        sort: SortArg,
        #[arg(long = "order", value_enum)]
        order: Option<OrderArg>,
    },
    /// Show a template and its variables
    Show { id: String },
    /// Create a custom template
    Create {
        #[arg(long = "name")]
        name: String,
        #[arg(long = "description", default_value = "")]
        description: String,
        #[arg(long = "category", default_value = "")]
        category: String,
        /// Base prompt with `[KEY]` placeholders
        #[arg(long = "prompt")]
        prompt: String,
        /// Variable as `KEY=Label`; append `:multiline` for a multi-line field
        #[arg(long = "variable", value_name = "KEY=LABEL")]
        variables: Vec<String>,
    },
    /// Delete a custom template
    Delete {
        id: String,
        /// Currently selected template id; prints the selection to use afterwards
        #[arg(long = "selected")]
        selected: Option<String>,
    },
    /// Move a custom template from one position to another (0-based)
    Move { from: usize, to: usize },
}

#[derive(Debug, Subcommand)]
pub enum GenerateCommand {
    /// Generate a text response
    Text(PromptArgs),
    /// Synthesize speech for a text and write it as WAV
    Speech {
        /// Text to speak; read from the prompt arguments when absent
        #[arg(long = "text")]
        text: Option<String>,
        #[command(flatten)]
        prompt: PromptArgs,
    },
    /// Generate a short video
    Video {
        #[command(flatten)]
        prompt: PromptArgs,
        #[arg(long = "aspect-ratio")]
        aspect_ratio: Option<String>,
        #[arg(long = "resolution")]
        resolution: Option<String>,
        #[arg(long = "model")]
        model: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProviderCommand {
    /// List configured providers
    List,
    /// Add a provider configuration and make it active
    Add {
        /// gemini, openai, grok, deepseek or anthropic
        provider: String,
        #[arg(long = "api-key", default_value = "")]
        api_key: String,
        #[arg(long = "model")]
        model: Option<String>,
        #[arg(long = "name")]
        name: Option<String>,
    },
    /// Remove a provider configuration
    Remove { id: String },
    /// Make a provider configuration active
    Use { id: String },
    /// Show recommended models for a provider
    Models { provider: String },
}

/// Where the prompt comes from: a literal prompt, or a template plus inputs.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct PromptArgs {
    /// Send this text as-is instead of assembling a template
    #[arg(short = 'p', long = "prompt", conflicts_with = "template")]
    pub prompt: Option<String>,
    /// Template id
    #[arg(short = 't', long = "template")]
    pub template: Option<String>,
    /// Template variable as `KEY=VALUE` (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,
    #[arg(long = "persona")]
    pub persona: Option<String>,
    #[arg(long = "audience")]
    pub audience: Option<String>,
    #[arg(long = "tone")]
    pub tone: Option<String>,
    #[arg(long = "style")]
    pub style: Option<String>,
    #[arg(long = "format")]
    pub format: Option<String>,
    #[arg(long = "length")]
    pub length: Option<String>,
    #[arg(long = "context")]
    pub context: Option<String>,
    /// Things to exclude, one per line
    #[arg(long = "avoid")]
    pub negative_constraints: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Category,
    Name,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Category => SortKey::Category,
            SortArg::Name => SortKey::Name,
            SortArg::Date => SortKey::Date,
        }
    }
}

impl From<OrderArg> for SortOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }
}

/// Split a `KEY=VALUE` pair.
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("Expected KEY=VALUE, got '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_command_with_vars() {
        let args = Args::try_parse_from([
            "promptforge",
            "assemble",
            "--template",
            "blog-post",
            "--var",
            "TOPIC=Rust",
            "--tone",
            "Formal",
        ])
        .unwrap();

        match args.command {
            Some(Commands::Assemble(prompt)) => {
                assert_eq!(prompt.template.as_deref(), Some("blog-post"));
                assert_eq!(prompt.vars, vec!["TOPIC=Rust"]);
                assert_eq!(prompt.tone.as_deref(), Some("Formal"));
                assert!(prompt.prompt.is_none());
            }
            other => panic!("Expected Assemble, got {:?}", other),
        }
    }

    #[test]
    fn test_prompt_and_template_conflict() {
        let result = Args::try_parse_from([
            "promptforge",
            "generate",
            "text",
            "--prompt",
            "hi",
            "--template",
            "blog-post",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_video_options() {
        let args = Args::try_parse_from([
            "promptforge",
            "-v",
            "generate",
            "video",
            "-p",
            "A fox",
            "--aspect-ratio",
            "9:16",
        ])
        .unwrap();

        assert!(args.verbose);
        match args.command {
            Some(Commands::Generate {
                action:
                    GenerateCommand::Video {
                        prompt,
                        aspect_ratio,
                        resolution,
                        ..
                    },
            }) => {
                assert_eq!(prompt.prompt.as_deref(), Some("A fox"));
                assert_eq!(aspect_ratio.as_deref(), Some("9:16"));
                assert!(resolution.is_none());
            }
            other => panic!("Expected Generate Video, got {:?}", other),
        }
    }

    #[test]
    fn test_templates_list_sort() {
        let args =
            Args::try_parse_from(["promptforge", "templates", "list", "--sort", "date"]).unwrap();

        match args.command {
            Some(Commands::Templates {
                action: TemplateCommand::List { sort, order, .. },
            }) => {
                assert_eq!(SortKey::from(sort), SortKey::Date);
                assert!(order.is_none());
            }
            other => panic!("Expected Templates List, got {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let args =
            Args::try_parse_from(["promptforge", "providers", "list", "--config", "/tmp/p.toml"])
                .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/p.toml")));
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("TOPIC=a=b").unwrap(),
            ("TOPIC".to_string(), "a=b".to_string())
        );
        assert!(parse_pair("TOPIC").is_err());
        assert!(parse_pair("=value").is_err());
    }
}
