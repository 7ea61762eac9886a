//! Query router.
//!
//! Scopes each question to exactly one knowledge base, forwards it to the
//! document-search service and turns the reply into an [`AnswerResult`].

use crate::catalog::DocumentCatalog;
use crate::citations::extract_citations;
use crate::registry::KnowledgeBaseRegistry;
use crate::types::{AnswerResult, KnowledgeBase, KnowledgeBaseHandle, Query};
use krepo_core::{AppConfig, AppError, AppResult};
use krepo_prompt::{build_system_prompt, load_system_prompt, SystemPromptDefinition};
use krepo_search::{create_client, FileSearchClient, GenerationSettings, SearchRequest};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Routes questions to the external index of the selected knowledge base.
pub struct QueryRouter {
    client: Arc<dyn FileSearchClient>,
    registry: KnowledgeBaseRegistry,
    catalog: DocumentCatalog,
    prompt: SystemPromptDefinition,
    model: String,
    settings: GenerationSettings,
}

impl QueryRouter {
    pub fn new(
        client: Arc<dyn FileSearchClient>,
        registry: KnowledgeBaseRegistry,
        catalog: DocumentCatalog,
        prompt: SystemPromptDefinition,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            registry,
            catalog,
            prompt,
            model: model.into(),
            settings: GenerationSettings::default(),
        }
    }

    /// Override the generation settings sent with every request.
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build a router from validated configuration.
    ///
    /// Creates the search client, the registry, the document catalog and the
    /// system prompt definition.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let client = create_client(
            &config.provider,
            config.endpoint.as_deref(),
            config.api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )
        .map_err(|e| AppError::Config(format!("Failed to create search client: {}", e)))?;

        let registry = KnowledgeBaseRegistry::from_config(config)?;
        let catalog = DocumentCatalog::load_dir(&config.mappings_dir())?;
        let prompt = load_system_prompt(&config.prompt_override_path())?;

        tracing::info!(
            "Query router ready (provider: {}, model: {})",
            client.provider_name(),
            config.model
        );

        Ok(Self::new(client, registry, catalog, prompt, config.model.clone()).with_settings(
            GenerationSettings {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        ))
    }

    pub fn registry(&self) -> &KnowledgeBaseRegistry {
        &self.registry
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask a question against one knowledge base.
    ///
    /// Makes exactly one outbound call. Blank questions fail with
    /// `AppError::EmptyQuery` before anything is sent; every failure of the
    /// call itself surfaces as `AppError::ExternalService`.
    pub async fn ask(&self, question: &str, kb: KnowledgeBase) -> AppResult<AnswerResult> {
        let query = Query::new(question, kb)?;
        let handle = self.registry.resolve(query.knowledge_base())?;

        let query_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("ask", %query_id, kb = %kb);

        self.dispatch(&query, handle).instrument(span).await
    }

    async fn dispatch(&self, query: &Query, handle: &KnowledgeBaseHandle) -> AppResult<AnswerResult> {
        let system = build_system_prompt(&self.prompt, handle.kb.key())?;

        let request = SearchRequest::new(query.question(), &handle.index_id, &self.model)
            .with_system(system)
            .with_temperature(self.settings.temperature)
            .with_max_output_tokens(self.settings.max_output_tokens);

        tracing::debug!("Dispatching question to {}", handle.index_id);

        let start = Instant::now();
        let response = self.client.search(&request).await.map_err(|e| match e {
            AppError::ExternalService(_) => e,
            other => AppError::ExternalService(other.to_string()),
        });
        let latency = start.elapsed();

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Search failed after {}ms: {}", latency.as_millis(), e);
                return Err(e);
            }
        };

        let citations = extract_citations(&response.grounding, &self.catalog);
        let result = AnswerResult {
            answer: response.answer.unwrap_or_default(),
            citations,
        };

        tracing::info!(
            "Answered in {}ms ({} citations, {} tokens{})",
            latency.as_millis(),
            result.citations.len(),
            response.usage.total_tokens,
            if result.is_empty() { ", empty answer" } else { "" }
        );

        Ok(result)
    }
}
