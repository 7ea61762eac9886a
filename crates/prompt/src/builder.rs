//! System instruction builder.

use crate::types::SystemPromptDefinition;
use krepo_core::{AppError, AppResult};
use handlebars::Handlebars;

/// Render the system instruction for one knowledge base.
///
/// The template receives a single variable, `guideline`, which is absent
/// when the definition has no block for `kb_key`.
///
/// # Example
/// ```no_run
/// use krepo_prompt::{build_system_prompt, default_system_prompt};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = default_system_prompt()?;
/// let system = build_system_prompt(&def, "tax_faq")?;
/// println!("{}", system);
/// # Ok(())
/// # }
/// ```
pub fn build_system_prompt(definition: &SystemPromptDefinition, kb_key: &str) -> AppResult<String> {
    tracing::debug!("Building system prompt {} for {}", definition.id, kb_key);

    let guideline = definition.guideline(kb_key);
    if guideline.is_none() {
        tracing::debug!("No guideline defined for {}", kb_key);
    }

    let variables = serde_json::json!({ "guideline": guideline });
    let rendered = render_template(&definition.template, &variables)?;

    Ok(rendered.trim_end().to_string())
}

/// Render a Handlebars template with variables.
pub(crate) fn render_template(template: &str, variables: &serde_json::Value) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("system", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("system", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Guideline;
    use std::collections::BTreeMap;

    fn create_test_definition() -> SystemPromptDefinition {
        let mut guidelines = BTreeMap::new();
        guidelines.insert(
            "tax_faq".to_string(),
            Guideline {
                title: "Tax guidance".to_string(),
                points: vec!["Cite filing deadlines".to_string()],
            },
        );

        SystemPromptDefinition {
            id: "test.system".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            template: "Base rules.\n{{#if guideline}}[{{guideline.title}}]{{#each guideline.points}} - {{this}}{{/each}}{{/if}}".to_string(),
            guidelines,
        }
    }

    #[test]
    fn test_render_simple_template() {
        let vars = serde_json::json!({ "guideline": { "title": "T" } });
        let rendered = render_template("Heading: {{guideline.title}}", &vars).unwrap();
        assert_eq!(rendered, "Heading: T");
    }

    #[test]
    fn test_build_with_guideline() {
        let def = create_test_definition();
        let system = build_system_prompt(&def, "tax_faq").unwrap();

        assert!(system.starts_with("Base rules."));
        assert!(system.contains("[Tax guidance]"));
        assert!(system.contains("- Cite filing deadlines"));
    }

    #[test]
    fn test_build_without_guideline() {
        let def = create_test_definition();
        let system = build_system_prompt(&def, "labor_faq").unwrap();

        assert_eq!(system, "Base rules.");
    }

    #[test]
    fn test_no_html_escaping() {
        let vars = serde_json::json!({ "guideline": { "title": "《勞動基準法》 & <細則>" } });
        let rendered = render_template("{{guideline.title}}", &vars).unwrap();
        assert_eq!(rendered, "《勞動基準法》 & <細則>");
    }

    #[test]
    fn test_invalid_template_is_prompt_error() {
        let vars = serde_json::json!({});
        let result = render_template("{{#if guideline}}unclosed", &vars);
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }
}
