//! Stores command handler.
//!
//! Lists the knowledge bases and the external index each one resolves to.

use clap::Args;
use krepo_core::{config::AppConfig, AppResult};
use krepo_knowledge::KnowledgeBaseRegistry;

/// List knowledge bases and their indexes
#[derive(Args, Debug)]
pub struct StoresCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StoresCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stores command");

        let registry = KnowledgeBaseRegistry::from_config(config)?;

        if self.json {
            let stores: Vec<_> = registry
                .handles()
                .map(|handle| {
                    serde_json::json!({
                        "key": handle.kb.key(),
                        "displayName": handle.kb.display_name(),
                        "group": handle.kb.group(),
                        "documentCount": handle.kb.document_count(),
                        "indexId": handle.index_id,
                    })
                })
                .collect();

            println!("{}", serde_json::to_string_pretty(&stores)?);
            return Ok(());
        }

        for handle in registry.handles() {
            println!(
                "{} {:<16} {:<14} {:>5} docs  {}",
                handle.kb.icon(),
                handle.kb.display_name(),
                handle.kb.key(),
                handle.kb.document_count(),
                handle.index_id
            );
        }

        Ok(())
    }
}
