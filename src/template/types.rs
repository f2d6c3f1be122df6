use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Category used when a template carries none.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A reusable prompt skeleton with named `[KEY]` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub base_prompt: String,
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// A placeholder bound to a user-supplied value at assembly time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVariable {
    /// Substitution token name, without brackets
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(rename = "type", default)]
    pub kind: VariableKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    #[default]
    #[serde(rename = "input")]
    SingleLine,
    #[serde(rename = "textarea")]
    MultiLine,
}

/// User-authored template data before an id and timestamp are assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub base_prompt: String,
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("Template {0} is required")]
    MissingField(&'static str),
    #[error("Invalid variable: {0}")]
    InvalidVariable(String),
    #[error("Template not found: {0}")]
    NotFound(String),
    #[error("Built-in template '{0}' cannot be modified")]
    BuiltIn(String),
    #[error("Index {index} out of range for {len} templates")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Normalize a variable key: uppercase, keeping only `A-Z`, `0-9` and `_`.
pub fn normalize_key(raw: &str) -> String {
    raw.to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

impl TemplateVariable {
    pub fn new(key: impl AsRef<str>, label: impl Into<String>) -> Self {
        Self {
            key: normalize_key(key.as_ref()),
            label: label.into(),
            placeholder: String::new(),
            kind: VariableKind::SingleLine,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn multi_line(mut self) -> Self {
        self.kind = VariableKind::MultiLine;
        self
    }

    /// The literal token this variable replaces in a base prompt.
    pub fn token(&self) -> String {
        format!("[{}]", self.key)
    }
}

impl Template {
    /// Category for grouping, with empty categories treated as absent.
    pub fn category_or_default(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => UNCATEGORIZED,
        }
    }

    pub fn created_at_or_zero(&self) -> i64 {
        self.created_at.unwrap_or(0)
    }

    pub fn variable(&self, key: &str) -> Option<&TemplateVariable> {
        self.variables.iter().find(|v| v.key == key)
    }
}

impl TemplateDraft {
    /// Check required fields and normalize variable keys in place.
    pub fn validate(mut self) -> Result<Self, TemplateError> {
        if self.name.trim().is_empty() {
            return Err(TemplateError::MissingField("name"));
        }
        if self.base_prompt.trim().is_empty() {
            return Err(TemplateError::MissingField("base prompt"));
        }

        let mut seen = HashSet::new();
        for variable in &mut self.variables {
            variable.key = normalize_key(&variable.key);
            if variable.key.is_empty() {
                return Err(TemplateError::InvalidVariable(format!(
                    "variable '{}' has an empty key",
                    variable.label
                )));
            }
            if !seen.insert(variable.key.clone()) {
                return Err(TemplateError::InvalidVariable(format!(
                    "duplicate key '{}'",
                    variable.key
                )));
            }
        }

        self.category = self.category.trim().to_string();
        Ok(self)
    }

    /// Turn a validated draft into a template with the given id and timestamp.
    pub fn into_template(self, id: String, created_at: i64) -> Template {
        Template {
            id,
            name: self.name,
            description: self.description,
            category: if self.category.is_empty() {
                None
            } else {
                Some(self.category)
            },
            base_prompt: self.base_prompt,
            variables: self.variables,
            created_at: Some(created_at),
        }
    }
}
