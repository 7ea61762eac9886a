//! Search client abstraction and request/response types.
//!
//! This module defines the contract with the external document-search
//! service: one scoped request in, one answer plus grounding chunks out.

use krepo_core::AppResult;
use serde::{Deserialize, Serialize};

/// A question scoped to exactly one external index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The user's question, passed verbatim
    pub question: String,

    /// External index identifier (e.g., "fileSearchStores/...")
    pub index_id: String,

    /// Model identifier (e.g., "gemini-2.5-flash")
    pub model: String,

    /// System instruction (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl SearchRequest {
    /// Create a new search request with required fields.
    pub fn new(
        question: impl Into<String>,
        index_id: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            index_id: index_id.into(),
            model: model.into(),
            system: None,
            temperature: None,
            max_output_tokens: None,
        }
    }

    /// Set the system instruction.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }
}

/// One retrieved passage the service grounded its answer on.
///
/// Every field is optional because the service omits whatever it does not
/// know about a passage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingChunk {
    /// Name of the uploaded file, usually a document id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// URI of the uploaded file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Retrieved text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Relevance score, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl GroundingChunk {
    /// Identifier of the source document: the title, else the last URI segment.
    pub fn raw_id(&self) -> String {
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            return title.to_string();
        }

        self.uri
            .as_deref()
            .and_then(|uri| uri.rsplit('/').next())
            .unwrap_or_default()
            .to_string()
    }
}

/// Response of the document-search service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Synthesized answer; `None` when the service produced no text
    pub answer: Option<String>,

    /// Grounding chunks in the order the service returned them
    #[serde(default)]
    pub grounding: Vec<GroundingChunk>,

    /// Model that produced the answer
    #[serde(default)]
    pub model: String,

    /// Usage statistics
    #[serde(default)]
    pub usage: SearchUsage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchUsage {
    /// Tokens in the prompt, including retrieved context
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Tokens in the answer
    #[serde(default)]
    pub completion_tokens: u32,

    /// Total tokens used
    #[serde(default)]
    pub total_tokens: u32,
}

impl SearchUsage {
    /// Create usage stats from prompt and completion token counts.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Trait for document-search providers.
///
/// Implementations make exactly one outbound call per `search` and report
/// every failure (transport, timeout, non-success status, undecodable body)
/// as `AppError::ExternalService`.
#[async_trait::async_trait]
pub trait FileSearchClient: Send + Sync {
    /// Get the provider name (e.g., "gemini", "mock").
    fn provider_name(&self) -> &str;

    /// Ask the service a question scoped to one index.
    async fn search(&self, request: &SearchRequest) -> AppResult<SearchResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = SearchRequest::new("q", "stores/a", "gemini-2.5-flash")
            .with_system("be precise")
            .with_temperature(0.1)
            .with_max_output_tokens(8000);

        assert_eq!(request.index_id, "stores/a");
        assert_eq!(request.system.as_deref(), Some("be precise"));
        assert_eq!(request.temperature, Some(0.1));
        assert_eq!(request.max_output_tokens, Some(8000));
    }

    #[test]
    fn test_raw_id_prefers_title() {
        let chunk = GroundingChunk {
            title: Some("mol_faq_0012".to_string()),
            uri: Some("files/abc123".to_string()),
            ..Default::default()
        };
        assert_eq!(chunk.raw_id(), "mol_faq_0012");
    }

    #[test]
    fn test_raw_id_falls_back_to_uri_tail() {
        let chunk = GroundingChunk {
            title: Some(String::new()),
            uri: Some("https://example.invalid/files/abc123".to_string()),
            ..Default::default()
        };
        assert_eq!(chunk.raw_id(), "abc123");

        assert_eq!(GroundingChunk::default().raw_id(), "");
    }

    #[test]
    fn test_usage_total() {
        let usage = SearchUsage::new(120, 30);
        assert_eq!(usage.total_tokens, 150);
    }

    #[test]
    fn test_usage_total_saturates() {
        let usage = SearchUsage::new(u32::MAX, 10);
        assert_eq!(usage.total_tokens, u32::MAX);
    }
}
