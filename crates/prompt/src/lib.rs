//! System instruction prompts for krepo.
//!
//! This crate provides:
//! - A YAML prompt definition with one guideline block per knowledge base
//! - Handlebars rendering of the system instruction sent with each question
//! - An embedded default definition, overridable from the data directory

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_system_prompt;
pub use loader::{default_system_prompt, load_system_prompt};
pub use types::{Guideline, SystemPromptDefinition};
