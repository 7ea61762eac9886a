//! Knowledge base registry.
//!
//! The fixed mapping from each knowledge base to its external index, built
//! once at startup from configuration and never mutated afterwards.

use crate::types::{KnowledgeBase, KnowledgeBaseHandle};
use krepo_core::config::KnowledgeBaseConfig;
use krepo_core::{AppConfig, AppError, AppResult};
use std::collections::{BTreeMap, HashMap};

/// Resolved index for every knowledge base.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBaseRegistry {
    handles: BTreeMap<KnowledgeBase, KnowledgeBaseHandle>,
}

impl KnowledgeBaseRegistry {
    /// Build the registry from the `knowledgeBases` config section.
    ///
    /// Knowledge bases missing from the section use their built-in index.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the section names an unknown key, an
    /// index id is blank, or two knowledge bases share an index.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Self::from_overrides(&config.knowledge_bases)
    }

    pub fn from_overrides(overrides: &BTreeMap<String, KnowledgeBaseConfig>) -> AppResult<Self> {
        let mut index_ids: HashMap<KnowledgeBase, String> = HashMap::new();

        for (key, kb_config) in overrides {
            let kb: KnowledgeBase = key.parse()?;
            if let Some(index_id) = &kb_config.index_id {
                index_ids.insert(kb, index_id.clone());
            }
        }

        let handles = KnowledgeBase::ALL
            .into_iter()
            .map(|kb| {
                let index_id = index_ids
                    .remove(&kb)
                    .unwrap_or_else(|| kb.default_index_id().to_string());
                (kb, KnowledgeBaseHandle { kb, index_id })
            })
            .collect();

        Self::new(handles)
    }

    /// Validate and wrap an explicit mapping.
    pub fn new(handles: BTreeMap<KnowledgeBase, KnowledgeBaseHandle>) -> AppResult<Self> {
        validate(&handles)?;

        tracing::debug!("Knowledge base registry built with {} entries", handles.len());

        Ok(Self { handles })
    }

    /// The handle for a knowledge base.
    pub fn resolve(&self, kb: KnowledgeBase) -> AppResult<&KnowledgeBaseHandle> {
        self.handles.get(&kb).ok_or_else(|| {
            AppError::Config(format!("Knowledge base {} is not registered", kb))
        })
    }

    /// All handles in display order.
    pub fn handles(&self) -> impl Iterator<Item = &KnowledgeBaseHandle> {
        self.handles.values()
    }
}

fn validate(handles: &BTreeMap<KnowledgeBase, KnowledgeBaseHandle>) -> AppResult<()> {
    let mut owners: HashMap<&str, KnowledgeBase> = HashMap::new();

    for kb in KnowledgeBase::ALL {
        let handle = handles.get(&kb).ok_or_else(|| {
            AppError::Config(format!("No index configured for knowledge base {}", kb))
        })?;

        let index_id = handle.index_id.trim();
        if index_id.is_empty() {
            return Err(AppError::Config(format!(
                "Index id for knowledge base {} must not be empty",
                kb
            )));
        }

        if let Some(other) = owners.insert(index_id, kb) {
            return Err(AppError::Config(format!(
                "Knowledge bases {} and {} share index {}",
                other, kb, index_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(entries: &[(&str, &str)]) -> BTreeMap<String, KnowledgeBaseConfig> {
        entries
            .iter()
            .map(|(key, id)| {
                (
                    key.to_string(),
                    KnowledgeBaseConfig {
                        index_id: Some(id.to_string()),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_defaults() {
        let registry = KnowledgeBaseRegistry::from_config(&AppConfig::default()).unwrap();

        for kb in KnowledgeBase::ALL {
            assert_eq!(registry.resolve(kb).unwrap().index_id, kb.default_index_id());
        }
        assert_eq!(registry.handles().count(), 4);
        assert_eq!(
            registry.handles().next().map(|h| h.kb),
            Some(KnowledgeBase::LaborFaq)
        );
    }

    #[test]
    fn test_override() {
        let registry =
            KnowledgeBaseRegistry::from_overrides(&overrides(&[("tax_faq", "fileSearchStores/tax-test")]))
                .unwrap();

        assert_eq!(
            registry.resolve(KnowledgeBase::TaxFaq).unwrap().index_id,
            "fileSearchStores/tax-test"
        );
        assert_eq!(
            registry.resolve(KnowledgeBase::LaborFaq).unwrap().index_id,
            KnowledgeBase::LaborFaq.default_index_id()
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = KnowledgeBaseRegistry::from_overrides(&overrides(&[("nhi", "stores/x")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_empty_index_rejected() {
        let result = KnowledgeBaseRegistry::from_overrides(&overrides(&[("law_articles", "  ")]));
        match result {
            Err(AppError::Config(msg)) => assert!(msg.contains("law_articles")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let result = KnowledgeBaseRegistry::from_overrides(&overrides(&[
            ("labor_faq", "fileSearchStores/shared"),
            ("tax_faq", "fileSearchStores/shared"),
        ]));
        match result {
            Err(AppError::Config(msg)) => assert!(msg.contains("share index")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_handle_rejected() {
        let mut handles = BTreeMap::new();
        handles.insert(
            KnowledgeBase::LaborFaq,
            KnowledgeBaseHandle {
                kb: KnowledgeBase::LaborFaq,
                index_id: "stores/a".to_string(),
            },
        );

        assert!(matches!(
            KnowledgeBaseRegistry::new(handles),
            Err(AppError::Config(_))
        ));
    }
}
