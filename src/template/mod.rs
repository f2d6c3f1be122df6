pub mod builtin;
pub mod catalog;
pub mod types;

#[cfg(test)]
mod tests;

pub use builtin::builtin_templates;
pub use catalog::{SortKey, SortOrder, TemplateGroup, format_timestamp};
pub use types::*;
