//! Serve command handler.
//!
//! Starts the web query form.

use clap::Args;
use krepo_core::{config::AppConfig, AppResult};
use krepo_knowledge::{LawCatalog, QueryRouter};
use krepo_web::AppState;

/// Start the web query form
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Listen address (default: 127.0.0.1:8501)
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        config.validate()?;

        let router = QueryRouter::from_config(config)?;
        let laws = LawCatalog::load(&config.law_mapping_path());
        let state = AppState::new(router, laws)?;

        krepo_web::serve(state, &config.bind).await
    }
}
