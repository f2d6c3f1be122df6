//! In-memory template management.
//!
//! Every operation takes a snapshot of the custom template collection and
//! returns the updated collection; persisting it is left to the caller.

use crate::template::builtin::{builtin_templates, is_builtin};
use crate::template::types::{Template, TemplateDraft, TemplateError, UNCATEGORIZED};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Category,
    Name,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortKey {
    /// Newest first for dates, A-Z otherwise.
    pub fn default_order(self) -> SortOrder {
        match self {
            SortKey::Date => SortOrder::Desc,
            SortKey::Category | SortKey::Name => SortOrder::Asc,
        }
    }
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Templates sharing a category, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateGroup {
    pub category: String,
    pub templates: Vec<Template>,
}

/// Built-in templates followed by the user's custom ones.
pub fn all_templates(custom: &[Template]) -> Vec<Template> {
    let mut all = builtin_templates();
    all.extend(custom.iter().cloned());
    all
}

/// Look up a template by id, falling back to the first built-in.
pub fn find_template(custom: &[Template], id: &str) -> Template {
    all_templates(custom)
        .into_iter()
        .find(|t| t.id == id)
        .unwrap_or_else(|| builtin_templates().remove(0))
}

/// Validate a draft and append it as a new custom template.
pub fn create_template(
    custom: &[Template],
    draft: TemplateDraft,
    now_millis: i64,
) -> Result<(Vec<Template>, Template), TemplateError> {
    let draft = draft.validate()?;

    let mut stamp = now_millis;
    while custom.iter().any(|t| t.id == format!("custom-{}", stamp)) {
        stamp += 1;
    }

    let template = draft.into_template(format!("custom-{}", stamp), now_millis);
    debug!("Created template {} ({})", template.id, template.name);

    let mut updated = custom.to_vec();
    updated.push(template.clone());
    Ok((updated, template))
}

/// Replace the content of an existing custom template, keeping its id and creation time.
pub fn update_template(
    custom: &[Template],
    id: &str,
    draft: TemplateDraft,
) -> Result<Vec<Template>, TemplateError> {
    if is_builtin(id) {
        return Err(TemplateError::BuiltIn(id.to_string()));
    }
    let draft = draft.validate()?;

    let index = custom
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;

    let mut updated = custom.to_vec();
    let created_at = updated[index].created_at_or_zero();
    updated[index] = draft.into_template(id.to_string(), created_at);
    Ok(updated)
}

pub fn delete_template(custom: &[Template], id: &str) -> Result<Vec<Template>, TemplateError> {
    if is_builtin(id) {
        return Err(TemplateError::BuiltIn(id.to_string()));
    }
    if !custom.iter().any(|t| t.id == id) {
        return Err(TemplateError::NotFound(id.to_string()));
    }
    Ok(custom.iter().filter(|t| t.id != id).cloned().collect())
}

/// Selection to use once `deleted_id` is gone: unchanged unless it was the deleted one.
pub fn selection_after_delete(selected_id: &str, deleted_id: &str) -> String {
    if selected_id == deleted_id {
        builtin_templates().remove(0).id
    } else {
        selected_id.to_string()
    }
}

/// Move the template at `from` so that it ends up at `to`.
pub fn reorder_templates(
    custom: &[Template],
    from: usize,
    to: usize,
) -> Result<Vec<Template>, TemplateError> {
    let len = custom.len();
    for index in [from, to] {
        if index >= len {
            return Err(TemplateError::IndexOutOfRange { index, len });
        }
    }

    let mut updated = custom.to_vec();
    let moved = updated.remove(from);
    updated.insert(to, moved);
    Ok(updated)
}

/// Case-insensitive match on name or description.
pub fn search_templates<'a>(templates: &'a [Template], term: &str) -> Vec<&'a Template> {
    let needle = term.to_lowercase();
    templates
        .iter()
        .filter(|t| {
            t.name.to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
        })
        .collect()
}

fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Group templates by category and order them for display.
///
/// With [`SortKey::Category`] only the categories are ordered and templates
/// keep their collection order. With name or date, templates are ordered
/// inside each category and categories are listed A-Z with
/// `Uncategorized` last.
pub fn group_templates<'a>(
    templates: impl IntoIterator<Item = &'a Template>,
    sort_by: SortKey,
    order: SortOrder,
) -> Vec<TemplateGroup> {
    let mut groups: Vec<TemplateGroup> = Vec::new();
    for template in templates {
        let category = template.category_or_default();
        match groups.iter_mut().find(|g| g.category == category) {
            Some(group) => group.templates.push(template.clone()),
            None => groups.push(TemplateGroup {
                category: category.to_string(),
                templates: vec![template.clone()],
            }),
        }
    }

    match sort_by {
        SortKey::Category => {
            groups.sort_by(|a, b| order.apply(locale_compare(&a.category, &b.category)));
        }
        SortKey::Name | SortKey::Date => {
            for group in &mut groups {
                group.templates.sort_by(|a, b| {
                    let ordering = match sort_by {
                        SortKey::Name => locale_compare(&a.name, &b.name),
                        _ => a.created_at_or_zero().cmp(&b.created_at_or_zero()),
                    };
                    order.apply(ordering)
                });
            }
            groups.sort_by(|a, b| {
                match (a.category == UNCATEGORIZED, b.category == UNCATEGORIZED) {
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    _ => locale_compare(&a.category, &b.category),
                }
            });
        }
    }

    groups
}

/// Backfill missing creation times so date sorting is total.
pub fn backfill_created_at(templates: Vec<Template>) -> Vec<Template> {
    templates
        .into_iter()
        .map(|mut t| {
            t.created_at = Some(t.created_at_or_zero());
            t
        })
        .collect()
}

/// Render a creation time as `Mon D, YYYY` (UTC); empty when unknown.
pub fn format_timestamp(millis: Option<i64>) -> String {
    match millis.filter(|m| *m != 0) {
        Some(ms) => chrono::DateTime::from_timestamp_millis(ms)
            .map(|dt| dt.format("%b %-d, %Y").to_string())
            .unwrap_or_default(),
        None => String::new(),
    }
}
