//! Command handlers for the CLI.

use crate::audio::AudioContext;
use crate::cli::args::{
    Args, Commands, GenerateCommand, PromptArgs, ProviderCommand, TemplateCommand, parse_pair,
};
use crate::cli::config::{AppConfig, ConfigDiscovery};
use crate::llm::{
    LLMError, ProviderConfig, ProviderDispatcher, ProviderKind, ReqwestTransport, VideoOptions,
};
use crate::prompt::{PromptInputs, assemble_prompt};
use crate::storage::{
    FileStore, IdentityProvider, KeyValueStore, LocalIdentityProvider, ProviderConfigRepository,
    TemplateRepository, UserIdentity, has_guest_data, migrate_guest_data,
};
use crate::template::catalog::{
    all_templates, create_template, delete_template, group_templates, reorder_templates,
    search_templates, selection_after_delete,
};
use crate::template::{
    SortKey, SortOrder, Template, TemplateDraft, TemplateVariable, VariableKind,
    builtin_templates, format_timestamp,
};
use anyhow::{Context, Result, anyhow, bail};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Opened store plus the signed-in user, if any.
pub struct Workspace {
    store: Arc<dyn KeyValueStore>,
    identity: LocalIdentityProvider,
    user: Option<UserIdentity>,
}

impl Workspace {
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let path = config.store_path();
        let store: Arc<dyn KeyValueStore> = Arc::new(
            FileStore::open(&path)
                .with_context(|| format!("Failed to open store at {}", path.display()))?,
        );
        let identity = LocalIdentityProvider::new(store.clone());
        let user = identity.current_user().await?;
        debug!(
            "Workspace opened for {}",
            user.as_ref().map(|u| u.id.as_str()).unwrap_or("guest")
        );
        Ok(Self {
            store,
            identity,
            user,
        })
    }

    fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn templates(&self) -> TemplateRepository {
        TemplateRepository::new(self.store.clone(), self.user_id())
    }

    pub fn providers(&self) -> ProviderConfigRepository {
        ProviderConfigRepository::new(self.store.clone(), self.user_id())
    }
}

/// Execute a parsed command line.
pub async fn run(args: Args, config: AppConfig, cancel: CancellationToken) -> Result<()> {
    let Some(command) = args.command else {
        return Ok(());
    };

    if let Commands::ShowConfig = command {
        ConfigDiscovery::show_discovery_info(&config);
        return Ok(());
    }

    let mut workspace = Workspace::open(&config).await?;
    match command {
        Commands::Templates { action } => run_templates(&workspace, action),
        Commands::Assemble(prompt) => {
            let custom = workspace.templates().load()?;
            println!("{}", resolve_prompt(&prompt, &custom)?);
            Ok(())
        }
        Commands::Generate { action } => run_generate(&workspace, &config, action, &cancel).await,
        Commands::Providers { action } => run_providers(&workspace, action),
        Commands::Login {
            email,
            password,
            migrate,
        } => {
            let user = workspace.identity.login(&email, &password).await?;
            after_sign_in(&mut workspace, user, migrate)
        }
        Commands::Register {
            email,
            password,
            migrate,
        } => {
            let user = workspace.identity.register(&email, &password).await?;
            after_sign_in(&mut workspace, user, migrate)
        }
        Commands::Logout => {
            workspace.identity.logout().await?;
            println!("Signed out.");
            Ok(())
        }
        Commands::Whoami => {
            match &workspace.user {
                Some(user) => println!("{} ({})", user.email, user.id),
                None => println!("Not signed in (guest)"),
            }
            Ok(())
        }
        Commands::ShowConfig => Ok(()),
    }
}

fn after_sign_in(workspace: &mut Workspace, user: UserIdentity, migrate: bool) -> Result<()> {
    println!("Signed in as {}", user.email);

    if migrate {
        let report = migrate_guest_data(workspace.store.clone(), &user.id)?;
        if report.is_empty() {
            println!("No guest data to migrate.");
        } else {
            println!(
                "Migrated {} template(s) and {} provider config(s) from guest storage.",
                report.templates, report.configs
            );
        }
    } else if has_guest_data(workspace.store.clone())? {
        println!(
            "Guest templates or providers exist; sign in again with --migrate-guest-data to move them."
        );
    }

    workspace.user = Some(user);
    Ok(())
}

fn run_templates(workspace: &Workspace, action: TemplateCommand) -> Result<()> {
    let repo = workspace.templates();
    let custom = repo.load()?;

    match action {
        TemplateCommand::List {
            search,
            sort,
            order,
        } => {
            let all = all_templates(&custom);
            let filtered = match search.as_deref() {
                Some(term) => search_templates(&all, term),
                None => all.iter().collect(),
            };
            if filtered.is_empty() {
                println!("No templates found.");
                return Ok(());
            }

            let key: SortKey = sort.into();
            let order: SortOrder = order.map(Into::into).unwrap_or_else(|| key.default_order());
            for group in group_templates(filtered, key, order) {
                println!("{}", group.category);
                for template in &group.templates {
                    let created = format_timestamp(template.created_at);
                    if created.is_empty() {
                        println!("  {:<28} {}", template.id, template.name);
                    } else {
                        println!("  {:<28} {} ({})", template.id, template.name, created);
                    }
                }
            }
        }
        TemplateCommand::Show { id } => {
            let template = lookup_template(&custom, &id)?;
            print_template(&template);
        }
        TemplateCommand::Create {
            name,
            description,
            category,
            prompt,
            variables,
        } => {
            let variables = variables
                .iter()
                .map(|raw| parse_variable_spec(raw))
                .collect::<Result<Vec<_>>>()?;
            let draft = TemplateDraft {
                name,
                description,
                category,
                base_prompt: prompt,
                variables,
            };
            let (updated, template) =
                create_template(&custom, draft, chrono::Utc::now().timestamp_millis())?;
            repo.save(&updated)?;
            info!("Saved template {}", template.id);
            println!("Created template {} ({})", template.name, template.id);
        }
        TemplateCommand::Delete { id, selected } => {
            let selection = delete_custom_template(&repo, &custom, &id, selected.as_deref())?;
            println!("Deleted template {}", id);
            if let Some(selection) = selection {
                println!("Selected template: {}", selection);
            }
        }
        TemplateCommand::Move { from, to } => {
            let updated = reorder_templates(&custom, from, to)?;
            repo.save(&updated)?;
            println!("Moved template from position {} to {}", from, to);
        }
    }

    Ok(())
}

/// Delete `id` and return the selection that replaces `selected`, if one was given.
fn delete_custom_template(
    repo: &TemplateRepository,
    custom: &[Template],
    id: &str,
    selected: Option<&str>,
) -> Result<Option<String>> {
    let updated = delete_template(custom, id)?;
    repo.save(&updated)?;
    Ok(selected.map(|selected| selection_after_delete(selected, id)))
}

fn print_template(template: &Template) {
    println!("{} ({})", template.name, template.id);
    println!("Category: {}", template.category_or_default());
    if !template.description.is_empty() {
        println!("Description: {}", template.description);
    }
    let created = format_timestamp(template.created_at);
    if !created.is_empty() {
        println!("Created: {}", created);
    }
    println!();
    println!("{}", template.base_prompt);
    if !template.variables.is_empty() {
        println!();
        println!("Variables:");
        for variable in &template.variables {
            let kind = match variable.kind {
                VariableKind::SingleLine => "",
                VariableKind::MultiLine => " (multi-line)",
            };
            println!("  {:<16} {}{}", variable.key, variable.label, kind);
        }
    }
}

/// Parse `KEY=Label`, with an optional `:multiline` suffix on the label.
pub fn parse_variable_spec(raw: &str) -> Result<TemplateVariable> {
    let (key, label) = parse_pair(raw).map_err(|e| anyhow!(e))?;
    Ok(match label.strip_suffix(":multiline") {
        Some(label) => TemplateVariable::new(key, label).multi_line(),
        None => TemplateVariable::new(key, label),
    })
}

fn lookup_template(custom: &[Template], id: &str) -> Result<Template> {
    all_templates(custom)
        .into_iter()
        .find(|t| t.id == id)
        .with_context(|| format!("Template not found: {}", id))
}

/// Inputs for `template`: defaults, then explicit fields, then `--var` pairs.
pub fn build_inputs(args: &PromptArgs, template: &Template) -> Result<PromptInputs> {
    let mut inputs = PromptInputs::for_template(template);

    let fields = [
        ("persona", &args.persona),
        ("audience", &args.audience),
        ("tone", &args.tone),
        ("style", &args.style),
        ("format", &args.format),
        ("length", &args.length),
        ("context", &args.context),
        ("negativeConstraints", &args.negative_constraints),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            inputs.set(field, value.clone());
        }
    }

    for raw in &args.vars {
        let (key, value) = parse_pair(raw).map_err(|e| anyhow!(e))?;
        if template.variable(&key).is_none() {
            warn!("Template {} has no variable {}", template.id, key);
        }
        inputs.set(&key, value);
    }

    Ok(inputs)
}

/// The literal `--prompt`, or the assembled template prompt.
pub fn resolve_prompt(args: &PromptArgs, custom: &[Template]) -> Result<String> {
    if let Some(prompt) = &args.prompt {
        return Ok(prompt.clone());
    }

    let template = match &args.template {
        Some(id) => lookup_template(custom, id)?,
        None => builtin_templates().remove(0),
    };
    let inputs = build_inputs(args, &template)?;
    Ok(assemble_prompt(&inputs, &template))
}

fn active_config(workspace: &Workspace) -> Result<ProviderConfig> {
    workspace.providers().active_config()?.context(
        "No provider configured. Add one with `promptforge providers add <provider> --api-key <key>`",
    )
}

fn dispatcher(config: &AppConfig) -> Result<ProviderDispatcher> {
    let transport = ReqwestTransport::new(config.request_timeout())?;
    Ok(ProviderDispatcher::new(
        Arc::new(transport),
        config.dispatcher_settings(),
    ))
}

/// Report user-initiated stops as a normal exit.
fn suppress_cancelled<T>(result: Result<T, LLMError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_cancelled() => {
            info!("Generation cancelled by user");
            println!("Cancelled.");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_generate(
    workspace: &Workspace,
    config: &AppConfig,
    action: GenerateCommand,
    cancel: &CancellationToken,
) -> Result<()> {
    let provider_config = active_config(workspace)?;
    let custom = workspace.templates().load()?;
    let dispatcher = dispatcher(config)?;

    match action {
        GenerateCommand::Text(prompt) => {
            let prompt = resolve_prompt(&prompt, &custom)?;
            let text = dispatcher.generate_text(&prompt, &provider_config).await?;
            println!("{}", text);
        }
        GenerateCommand::Speech { text, prompt } => {
            let text = match text {
                Some(text) => text,
                None => resolve_prompt(&prompt, &custom)?,
            };
            let result = dispatcher
                .generate_speech(&text, &provider_config, Some(cancel))
                .await;
            if let Some(audio) = suppress_cancelled(result)? {
                let mut context = AudioContext::new(config.audio_path());
                let rendered = context.render(&audio)?;
                context.close();
                println!(
                    "Speech saved to {} ({:.1}s)",
                    rendered.path.display(),
                    rendered.duration.as_secs_f64()
                );
            }
        }
        GenerateCommand::Video {
            prompt,
            aspect_ratio,
            resolution,
            model,
        } => {
            let prompt = resolve_prompt(&prompt, &custom)?;
            let options = VideoOptions {
                aspect_ratio,
                resolution,
                model,
            };
            let on_progress = |status: &str| println!("⏳ {}", status);
            let result = dispatcher
                .generate_video(&prompt, &provider_config, &on_progress, Some(cancel), options)
                .await;
            if let Some(media) = suppress_cancelled(result)? {
                println!("Video saved to {}", media.path.display());
                println!("{}", media.uri);
            }
        }
    }

    Ok(())
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    match chars.len() {
        0 => "(none)".to_string(),
        n if n <= 8 => "****".to_string(),
        n => format!(
            "{}...{}",
            chars[..4].iter().collect::<String>(),
            chars[n - 4..].iter().collect::<String>()
        ),
    }
}

fn parse_provider(name: &str) -> Result<ProviderKind> {
    match ProviderKind::from(name.to_lowercase()) {
        ProviderKind::Unknown(name) => bail!(
            "Unknown provider '{}'. Expected one of: {}",
            name,
            ProviderKind::KNOWN
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        kind => Ok(kind),
    }
}

fn run_providers(workspace: &Workspace, action: ProviderCommand) -> Result<()> {
    let repo = workspace.providers();

    match action {
        ProviderCommand::List => {
            let configs = repo.load()?;
            if configs.is_empty() {
                println!("No providers configured.");
                return Ok(());
            }
            let active = repo.active_config()?.map(|c| c.id);
            for config in &configs {
                let marker = if active.as_deref() == Some(config.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {}  {} [{}] model={} key={}",
                    marker,
                    config.id,
                    config.name,
                    config.provider,
                    config.model,
                    mask_key(&config.api_key)
                );
            }
        }
        ProviderCommand::Add {
            provider,
            api_key,
            model,
            name,
        } => {
            let kind = parse_provider(&provider)?;
            // An empty Gemini key falls back to the environment at request time.
            if !(kind == ProviderKind::Gemini && api_key.is_empty())
                && let Err(hint) = kind.validate_api_key(&api_key)
            {
                println!("⚠️  {}", hint);
                if let Some(url) = kind.key_url() {
                    println!("   Get a key at {}", url);
                }
            }

            let mut config = ProviderConfig::new(kind, api_key);
            if let Some(model) = model {
                config = config.with_model(model);
            }
            if let Some(name) = name {
                config = config.with_name(name);
            }
            let id = config.id.clone();
            repo.upsert(config)?;
            println!("Added provider {} and made it active", id);
        }
        ProviderCommand::Remove { id } => {
            let configs = repo.load()?;
            if !configs.iter().any(|c| c.id == id) {
                bail!("Provider config not found: {}", id);
            }
            repo.delete(&id)?;
            println!("Removed provider {}", id);
        }
        ProviderCommand::Use { id } => {
            let configs = repo.load()?;
            if !configs.iter().any(|c| c.id == id) {
                bail!("Provider config not found: {}", id);
            }
            repo.set_active(&id)?;
            println!("Active provider: {}", id);
        }
        ProviderCommand::Models { provider } => {
            let kind = parse_provider(&provider)?;
            for option in kind.recommended_models() {
                let default = if kind.default_model() == Some(option.value) {
                    " (default)"
                } else {
                    ""
                };
                println!("  {:<32} {}{}", option.value, option.label, default);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> AppConfig {
        AppConfig {
            storage_dir: Some(temp_dir.path().to_path_buf()),
            ..AppConfig::default()
        }
    }

    async fn run_cli(config: &AppConfig, argv: &[&str]) -> Result<()> {
        let mut full = vec!["promptforge"];
        full.extend_from_slice(argv);
        let args = Args::try_parse_from(full)?;
        run(args, config.clone(), CancellationToken::new()).await
    }

    #[test]
    fn test_parse_variable_spec() {
        let variable = parse_variable_spec("topic name=Topic:multiline").unwrap();
        assert_eq!(variable.key, "TOPICNAME");
        assert_eq!(variable.label, "Topic");
        assert_eq!(variable.kind, VariableKind::MultiLine);

        assert!(parse_variable_spec("no-label").is_err());
    }

    #[test]
    fn test_resolve_prompt_fills_template() {
        let args = PromptArgs {
            template: Some("blog-post".to_string()),
            vars: vec!["TOPIC=Rust ownership".to_string()],
            tone: Some("Witty".to_string()),
            ..PromptArgs::default()
        };

        let prompt = resolve_prompt(&args, &[]).unwrap();
        assert!(prompt.contains("Rust ownership"));
        assert!(prompt.contains("Witty"));
        assert!(!prompt.contains("[TOPIC]"));
    }

    #[test]
    fn test_resolve_prompt_literal_and_unknown_template() {
        let literal = PromptArgs {
            prompt: Some("Say hi".to_string()),
            ..PromptArgs::default()
        };
        assert_eq!(resolve_prompt(&literal, &[]).unwrap(), "Say hi");

        let missing = PromptArgs {
            template: Some("nope".to_string()),
            ..PromptArgs::default()
        };
        assert!(resolve_prompt(&missing, &[]).is_err());
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(""), "(none)");
        assert_eq!(mask_key("short"), "****");
        assert_eq!(mask_key("sk-abcdefghijkl"), "sk-a...ijkl");
    }

    #[tokio::test]
    async fn test_template_create_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        run_cli(
            &config,
            &[
                "templates",
                "create",
                "--name",
                "Haiku",
                "--prompt",
                "Write a haiku about [SUBJECT].",
                "--variable",
                "SUBJECT=Subject",
            ],
        )
        .await
        .unwrap();

        let workspace = Workspace::open(&config).await.unwrap();
        let custom = workspace.templates().load().unwrap();
        assert_eq!(custom.len(), 1);
        assert!(custom[0].id.starts_with("custom-"));

        let id = custom[0].id.clone();
        run_cli(&config, &["templates", "delete", &id]).await.unwrap();
        assert!(workspace.templates().load().unwrap().is_empty());

        assert!(
            run_cli(&config, &["templates", "delete", "blog-post"])
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_delete_reports_selection_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let workspace = Workspace::open(&config).await.unwrap();
        let repo = workspace.templates();

        let draft = |name: &str| TemplateDraft {
            name: name.to_string(),
            base_prompt: "Do [THING].".to_string(),
            ..TemplateDraft::default()
        };
        let (custom, first) = create_template(&[], draft("One"), 1).unwrap();
        let (custom, second) = create_template(&custom, draft("Two"), 2).unwrap();
        repo.save(&custom).unwrap();

        let selection = delete_custom_template(&repo, &custom, &first.id, Some(&first.id)).unwrap();
        assert_eq!(selection.as_deref(), Some("blog-post"));

        let custom = repo.load().unwrap();
        let selection =
            delete_custom_template(&repo, &custom, &second.id, Some("email-draft")).unwrap();
        assert_eq!(selection.as_deref(), Some("email-draft"));
        assert!(repo.load().unwrap().is_empty());

        assert_eq!(
            delete_custom_template(&repo, &[], "blog-post", None)
                .unwrap_err()
                .to_string(),
            "Built-in template 'blog-post' cannot be modified"
        );
    }

    #[tokio::test]
    async fn test_providers_add_use_remove() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        run_cli(&config, &["providers", "add", "openai", "--api-key", "sk-x"])
            .await
            .unwrap();
        run_cli(&config, &["providers", "add", "gemini"]).await.unwrap();
        assert!(run_cli(&config, &["providers", "add", "mistral"]).await.is_err());

        let workspace = Workspace::open(&config).await.unwrap();
        let configs = workspace.providers().load().unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[1].model, "gemini-2.5-flash");
        assert_eq!(
            workspace.providers().active_id().unwrap().as_deref(),
            Some(configs[1].id.as_str())
        );

        run_cli(&config, &["providers", "use", &configs[0].id])
            .await
            .unwrap();
        assert_eq!(
            workspace.providers().active_id().unwrap().as_deref(),
            Some(configs[0].id.as_str())
        );

        run_cli(&config, &["providers", "remove", &configs[0].id])
            .await
            .unwrap();
        assert_eq!(
            workspace.providers().active_id().unwrap().as_deref(),
            Some(configs[1].id.as_str())
        );
        assert!(run_cli(&config, &["providers", "use", "gone"]).await.is_err());
    }

    #[tokio::test]
    async fn test_register_with_guest_migration() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        run_cli(&config, &["providers", "add", "gemini"]).await.unwrap();
        run_cli(
            &config,
            &[
                "register",
                "ada@example.com",
                "--password",
                "secret",
                "--migrate-guest-data",
            ],
        )
        .await
        .unwrap();

        let workspace = Workspace::open(&config).await.unwrap();
        assert_eq!(
            workspace.user.as_ref().map(|u| u.email.as_str()),
            Some("ada@example.com")
        );
        assert_eq!(workspace.providers().load().unwrap().len(), 1);
        assert!(!has_guest_data(workspace.store.clone()).unwrap());

        run_cli(&config, &["logout"]).await.unwrap();
        let workspace = Workspace::open(&config).await.unwrap();
        assert!(workspace.user.is_none());
        assert!(workspace.providers().load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_without_provider_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let err = run_cli(&config, &["generate", "text", "-p", "hi"])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No provider configured"));
    }
}
