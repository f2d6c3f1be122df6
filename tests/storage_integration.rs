//! Persistence across store reopen and user namespaces.

use promptforge::env::storage::PROVIDER_CONFIGS_KEY;
use promptforge::llm::{ProviderConfig, ProviderKind};
use promptforge::storage::{
    FileStore, IdentityProvider, KeyValueStore, LocalIdentityProvider, ProviderConfigRepository,
    TemplateRepository, migrate_guest_data,
};
use promptforge::template::TemplateDraft;
use promptforge::template::catalog::create_template;
use std::sync::Arc;
use tempfile::TempDir;

fn open(temp_dir: &TempDir) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::open(temp_dir.path().join("store.json")).unwrap())
}

#[tokio::test]
async fn test_guest_work_survives_sign_up_and_restart() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = open(&temp_dir);
        let draft = TemplateDraft {
            name: "Standup".to_string(),
            base_prompt: "Summarize [NOTES].".to_string(),
            ..TemplateDraft::default()
        };
        let (custom, _) = create_template(&[], draft, 42).unwrap();
        TemplateRepository::new(store.clone(), None).save(&custom).unwrap();
        ProviderConfigRepository::new(store.clone(), None)
            .upsert(ProviderConfig::new(ProviderKind::Anthropic, "sk-ant-key"))
            .unwrap();

        let identity = LocalIdentityProvider::new(store.clone());
        let user = identity.register("grace@example.com", "hunter2").await.unwrap();
        let report = migrate_guest_data(store, &user.id).unwrap();
        assert_eq!((report.templates, report.configs), (1, 1));
    }

    let store = open(&temp_dir);
    let identity = LocalIdentityProvider::new(store.clone());
    let user = identity.current_user().await.unwrap().unwrap();
    assert_eq!(user.email, "grace@example.com");

    let templates = TemplateRepository::new(store.clone(), Some(&user.id))
        .load()
        .unwrap();
    assert_eq!(templates[0].name, "Standup");
    assert_eq!(templates[0].created_at, Some(42));

    let configs = ProviderConfigRepository::new(store.clone(), Some(&user.id));
    assert_eq!(
        configs.active_config().unwrap().map(|c| c.provider),
        Some(ProviderKind::Anthropic)
    );
    assert_eq!(store.get(PROVIDER_CONFIGS_KEY).unwrap(), None);
}

#[test]
fn test_unknown_persisted_provider_is_preserved() {
    let temp_dir = TempDir::new().unwrap();
    let store = open(&temp_dir);
    store
        .set(
            PROVIDER_CONFIGS_KEY,
            r#"[{"id":"c1","name":"Old","provider":"mistral","apiKey":"k","model":"m"}]"#,
        )
        .unwrap();

    let configs = ProviderConfigRepository::new(store, None).load().unwrap();
    assert_eq!(configs[0].provider, ProviderKind::Unknown("mistral".to_string()));
}

#[test]
fn test_concurrent_handles_keep_each_others_writes() {
    let temp_dir = TempDir::new().unwrap();
    let long_running = open(&temp_dir);
    let short_lived = open(&temp_dir);

    let draft = TemplateDraft {
        name: "Digest".to_string(),
        base_prompt: "Digest [TEXT].".to_string(),
        ..TemplateDraft::default()
    };
    let (custom, _) = create_template(&[], draft, 7).unwrap();
    TemplateRepository::new(long_running.clone(), None)
        .save(&custom)
        .unwrap();

    ProviderConfigRepository::new(short_lived.clone(), None)
        .upsert(ProviderConfig::new(ProviderKind::Gemini, ""))
        .unwrap();

    let templates = TemplateRepository::new(long_running.clone(), None);
    let configs = ProviderConfigRepository::new(long_running, None);
    assert_eq!(templates.load().unwrap().len(), 1);
    assert_eq!(configs.load().unwrap().len(), 1);

    let reopened = open(&temp_dir);
    assert_eq!(
        TemplateRepository::new(reopened.clone(), None)
            .load()
            .unwrap()
            .len(),
        1
    );
    assert!(
        ProviderConfigRepository::new(reopened, None)
            .active_config()
            .unwrap()
            .is_some()
    );
}
