//! Prompt types for krepo.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A system instruction definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemPromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Template string with Handlebars syntax; receives `guideline`
    pub template: String,

    /// Knowledge-base key -> guideline block
    #[serde(default)]
    pub guidelines: BTreeMap<String, Guideline>,
}

/// Answering guidance specific to one knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guideline {
    /// Heading shown in the instruction
    pub title: String,

    /// Bullet points
    #[serde(default)]
    pub points: Vec<String>,
}

impl SystemPromptDefinition {
    /// Guideline for a knowledge-base key, if one is defined.
    pub fn guideline(&self, kb_key: &str) -> Option<&Guideline> {
        self.guidelines.get(kb_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_deserialization() {
        let yaml = r#"
id: test.system
title: Test
apiVersion: "1.0"
template: "Base {{guideline.title}}"
guidelines:
  tax_faq:
    title: Tax
    points: [one, two]
"#;

        let def: SystemPromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "test.system");
        assert_eq!(def.guideline("tax_faq").unwrap().points, vec!["one", "two"]);
        assert!(def.guideline("labor_faq").is_none());
    }

    #[test]
    fn test_guidelines_default_to_empty() {
        let yaml = r#"
id: bare
title: Bare
apiVersion: "1.0"
template: "Only the base"
"#;

        let def: SystemPromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert!(def.guidelines.is_empty());
    }
}
