//! Per-user persisted collections.
//!
//! Guests read and write the bare keys; signed-in users get `{key}_{user_id}`.

use crate::env::storage::{
    ACTIVE_CONFIG_KEY, PROVIDER_CONFIGS_KEY, TEMPLATES_KEY, namespaced,
};
use crate::llm::ProviderConfig;
use crate::storage::store::{KeyValueStore, load_json, save_json};
use crate::storage::types::{MigrationReport, StorageError};
use crate::template::Template;
use crate::template::catalog::backfill_created_at;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct TemplateRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl TemplateRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, user_id: Option<&str>) -> Self {
        Self {
            store,
            key: namespaced(TEMPLATES_KEY, user_id),
        }
    }

    pub fn load(&self) -> Result<Vec<Template>, StorageError> {
        let templates: Vec<Template> = load_json(&*self.store, &self.key)?.unwrap_or_default();
        Ok(backfill_created_at(templates))
    }

    pub fn save(&self, templates: &[Template]) -> Result<(), StorageError> {
        save_json(&*self.store, &self.key, templates)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(&self.key)
    }
}

/// Provider configurations plus the pointer to the active one.
#[derive(Clone)]
pub struct ProviderConfigRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
    active_key: String,
}

impl ProviderConfigRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, user_id: Option<&str>) -> Self {
        Self {
            store,
            key: namespaced(PROVIDER_CONFIGS_KEY, user_id),
            active_key: namespaced(ACTIVE_CONFIG_KEY, user_id),
        }
    }

    pub fn load(&self) -> Result<Vec<ProviderConfig>, StorageError> {
        Ok(load_json(&*self.store, &self.key)?.unwrap_or_default())
    }

    pub fn save(&self, configs: &[ProviderConfig]) -> Result<(), StorageError> {
        save_json(&*self.store, &self.key, configs)
    }

    pub fn active_id(&self) -> Result<Option<String>, StorageError> {
        Ok(self.store.get(&self.active_key)?.filter(|id| !id.is_empty()))
    }

    pub fn set_active(&self, id: &str) -> Result<(), StorageError> {
        self.store.set(&self.active_key, id)
    }

    /// The configuration the pointer names, else the first one.
    pub fn active_config(&self) -> Result<Option<ProviderConfig>, StorageError> {
        let configs = self.load()?;
        let active = self.active_id()?;
        let found = active
            .as_deref()
            .and_then(|id| configs.iter().find(|c| c.id == id));
        Ok(found.or(configs.first()).cloned())
    }

    /// Insert or replace by id.
    ///
    /// A new configuration becomes active, as does any configuration saved
    /// while nothing is active.
    pub fn upsert(&self, config: ProviderConfig) -> Result<Vec<ProviderConfig>, StorageError> {
        let mut configs = self.load()?;
        let is_new = match configs.iter_mut().find(|c| c.id == config.id) {
            Some(existing) => {
                *existing = config.clone();
                false
            }
            None => {
                configs.push(config.clone());
                true
            }
        };
        self.save(&configs)?;

        if is_new || self.active_id()?.is_none() {
            self.set_active(&config.id)?;
        }
        Ok(configs)
    }

    /// Remove by id. Deleting the active configuration moves the pointer to
    /// the first remaining one, or clears it.
    pub fn delete(&self, id: &str) -> Result<Vec<ProviderConfig>, StorageError> {
        let mut configs = self.load()?;
        configs.retain(|c| c.id != id);
        self.save(&configs)?;

        if self.active_id()?.as_deref() == Some(id) {
            match configs.first() {
                Some(first) => self.set_active(&first.id)?,
                None => self.store.remove(&self.active_key)?,
            }
        }
        Ok(configs)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(&self.key)?;
        self.store.remove(&self.active_key)
    }
}

/// Move guest templates, configurations and the active pointer into a
/// user's namespace, then clear the guest keys.
///
/// Items whose id already exists for the user are kept as the user has them.
pub fn migrate_guest_data(
    store: Arc<dyn KeyValueStore>,
    user_id: &str,
) -> Result<MigrationReport, StorageError> {
    let guest_templates = TemplateRepository::new(store.clone(), None);
    let guest_configs = ProviderConfigRepository::new(store.clone(), None);
    let user_templates = TemplateRepository::new(store.clone(), Some(user_id));
    let user_configs = ProviderConfigRepository::new(store, Some(user_id));

    let mut report = MigrationReport::default();

    let incoming = guest_templates.load()?;
    if !incoming.is_empty() {
        let mut templates = user_templates.load()?;
        for template in incoming {
            if !templates.iter().any(|t| t.id == template.id) {
                templates.push(template);
                report.templates += 1;
            }
        }
        user_templates.save(&templates)?;
    }

    let incoming = guest_configs.load()?;
    if !incoming.is_empty() {
        let mut configs = user_configs.load()?;
        for config in incoming {
            if !configs.iter().any(|c| c.id == config.id) {
                configs.push(config);
                report.configs += 1;
            }
        }
        user_configs.save(&configs)?;
    }

    if let Some(active) = guest_configs.active_id()?
        && user_configs.active_id()?.is_none()
    {
        user_configs.set_active(&active)?;
        report.active_config_moved = true;
    }

    discard_guest_data(&guest_templates, &guest_configs)?;

    if !report.is_empty() {
        info!(
            "Migrated {} templates and {} provider configs to user {}",
            report.templates, report.configs, user_id
        );
    }
    Ok(report)
}

fn discard_guest_data(
    templates: &TemplateRepository,
    configs: &ProviderConfigRepository,
) -> Result<(), StorageError> {
    templates.clear()?;
    configs.clear()
}

/// Whether the guest namespace holds anything worth offering to migrate.
pub fn has_guest_data(store: Arc<dyn KeyValueStore>) -> Result<bool, StorageError> {
    let templates = TemplateRepository::new(store.clone(), None).load()?;
    let configs = ProviderConfigRepository::new(store, None).load()?;
    Ok(!templates.is_empty() || !configs.is_empty())
}

/// Drop guest data without migrating it.
pub fn clear_guest_data(store: Arc<dyn KeyValueStore>) -> Result<(), StorageError> {
    discard_guest_data(
        &TemplateRepository::new(store.clone(), None),
        &ProviderConfigRepository::new(store, None),
    )
}
