use crate::template::Template;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TONE_OPTIONS: &[&str] = &[
    "Professional",
    "Friendly",
    "Humorous",
    "Authoritative",
    "Empathetic",
    "Formal",
    "Informal",
];

pub const STYLE_OPTIONS: &[&str] = &[
    "Concise",
    "Descriptive",
    "Academic",
    "Journalistic",
    "Narrative",
    "Persuasive",
];

pub const FORMAT_OPTIONS: &[&str] = &[
    "Plain Text",
    "Markdown",
    "JSON",
    "Bullet Points",
    "Numbered List",
    "HTML",
];

pub const DEFAULT_PERSONA: &str = "a helpful assistant";
pub const DEFAULT_LENGTH: &str = "about 2-3 paragraphs";

/// Field values fed to the assembler: fixed stylistic fields plus one entry
/// per template variable key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptInputs {
    #[serde(default)]
    pub persona: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub negative_constraints: String,
    #[serde(flatten)]
    pub variables: BTreeMap<String, String>,
}

impl PromptInputs {
    /// The starting inputs shown for a freshly selected template.
    pub fn defaults() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            tone: TONE_OPTIONS[0].to_string(),
            style: STYLE_OPTIONS[0].to_string(),
            format: FORMAT_OPTIONS[0].to_string(),
            length: DEFAULT_LENGTH.to_string(),
            ..Default::default()
        }
    }

    /// Default inputs with an empty entry for every variable of `template`.
    pub fn for_template(template: &Template) -> Self {
        let mut inputs = Self::defaults();
        inputs.seed_variables(template);
        inputs
    }

    /// Ensure every variable of `template` has an entry, keeping existing values.
    pub fn seed_variables(&mut self, template: &Template) {
        for variable in &template.variables {
            self.variables.entry(variable.key.clone()).or_default();
        }
    }

    pub fn variable(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Read a field by name; anything that is not a fixed field is a variable.
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            "persona" => Some(&self.persona),
            "audience" => Some(&self.audience),
            "tone" => Some(&self.tone),
            "style" => Some(&self.style),
            "format" => Some(&self.format),
            "length" => Some(&self.length),
            "context" => Some(&self.context),
            "negativeConstraints" => Some(&self.negative_constraints),
            key => self.variable(key),
        }
    }

    /// Write a field by name; anything that is not a fixed field is a variable.
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        match field {
            "persona" => self.persona = value,
            "audience" => self.audience = value,
            "tone" => self.tone = value,
            "style" => self.style = value,
            "format" => self.format = value,
            "length" => self.length = value,
            "context" => self.context = value,
            "negativeConstraints" => self.negative_constraints = value,
            key => {
                self.variables.insert(key.to_string(), value);
            }
        }
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }
}
