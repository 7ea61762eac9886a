//! Prompt loader for the system instruction definition.

use crate::builder::render_template;
use crate::types::SystemPromptDefinition;
use krepo_core::{AppError, AppResult};
use std::path::Path;

/// Built-in definition, compiled into the binary.
const DEFAULT_SYSTEM_PROMPT: &str = include_str!("../prompts/system.yml");

/// Parse and validate the built-in system prompt definition.
pub fn default_system_prompt() -> AppResult<SystemPromptDefinition> {
    parse_definition(DEFAULT_SYSTEM_PROMPT, "built-in system prompt")
}

/// Load the system prompt definition.
///
/// Uses the YAML file at `override_path` when it exists, otherwise the
/// built-in definition.
///
/// # Example
/// ```no_run
/// use krepo_prompt::load_system_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = load_system_prompt(Path::new("data/prompts/system.yml"))?;
/// println!("Loaded prompt: {}", def.title);
/// # Ok(())
/// # }
/// ```
pub fn load_system_prompt(override_path: &Path) -> AppResult<SystemPromptDefinition> {
    if !override_path.exists() {
        tracing::debug!(
            "No prompt override at {:?}, using built-in definition",
            override_path
        );
        return default_system_prompt();
    }

    let contents = std::fs::read_to_string(override_path).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            override_path, e
        ))
    })?;

    let definition = parse_definition(&contents, &format!("{:?}", override_path))?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

fn parse_definition(contents: &str, origin: &str) -> AppResult<SystemPromptDefinition> {
    let definition: SystemPromptDefinition = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e))
    })?;

    validate_prompt(&definition)?;

    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &SystemPromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    // Catch template syntax errors at load time rather than on the first question
    render_template(&def.template, &serde_json::json!({}))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_prompt_covers_every_knowledge_base() {
        let def = default_system_prompt().unwrap();
        assert_eq!(def.id, "hr.advisor.system");
        for key in ["labor_faq", "labor_articles", "tax_faq", "law_articles"] {
            assert!(def.guideline(key).is_some(), "missing guideline for {}", key);
        }
    }

    #[test]
    fn test_default_prompt_renders_guideline() {
        let def = default_system_prompt().unwrap();
        let system = crate::build_system_prompt(&def, "law_articles").unwrap();
        assert!(system.contains("HR 法規顧問"));
        assert!(system.contains("【法規條文指引】"));
        assert!(system.contains("引用完整的法條內容"));
        assert!(!system.contains("稅務問答指引"));
    }

    #[test]
    fn test_missing_override_falls_back_to_default() {
        let temp_dir = TempDir::new().unwrap();
        let def = load_system_prompt(&temp_dir.path().join("prompts/system.yml")).unwrap();
        assert_eq!(def.id, "hr.advisor.system");
    }

    #[test]
    fn test_load_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("system.yml");
        fs::write(
            &path,
            r#"
id: custom.system
title: Custom
apiVersion: "2.0"
template: "Answer briefly."
"#,
        )
        .unwrap();

        let def = load_system_prompt(&path).unwrap();
        assert_eq!(def.id, "custom.system");
        assert!(def.guidelines.is_empty());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("system.yml");
        fs::write(&path, "invalid: yaml: content:").unwrap();

        assert!(matches!(load_system_prompt(&path), Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_empty_template_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("system.yml");
        fs::write(
            &path,
            "id: empty\ntitle: Empty\napiVersion: \"1.0\"\ntemplate: \"  \"\n",
        )
        .unwrap();

        match load_system_prompt(&path) {
            Err(AppError::Prompt(msg)) => assert!(msg.contains("template cannot be empty")),
            other => panic!("expected prompt error, got {:?}", other.map(|d| d.id)),
        }
    }
}
