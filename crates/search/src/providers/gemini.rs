//! Gemini File Search provider implementation.
//!
//! One `generateContent` call per question, with the `fileSearch` tool
//! scoped to a single file search store.
//! API: https://ai.google.dev/gemini-api/docs/file-search

use crate::client::{FileSearchClient, GroundingChunk, SearchRequest, SearchResponse, SearchUsage};
use krepo_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gemini `generateContent` request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    file_search: FileSearch,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileSearch {
    file_search_store_names: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Gemini `generateContent` response format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<WireGroundingChunk>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGroundingChunk {
    #[serde(default)]
    retrieved_context: Option<RetrievedContext>,
}

#[derive(Debug, Deserialize)]
struct RetrievedContext {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Gemini File Search client.
pub struct GeminiClient {
    /// Base URL for the Gemini API
    base_url: String,

    /// API credential
    api_key: String,

    /// Request timeout, reported in timeout errors
    timeout: Duration,

    /// HTTP client
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client with the default endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_options(DEFAULT_BASE_URL, api_key, DEFAULT_TIMEOUT)
    }

    /// Create a new Gemini client with a custom base URL and request timeout.
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
            client,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// Convert a SearchRequest to the Gemini wire format.
    fn to_wire_request(&self, request: &SearchRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.question.clone(),
                }],
            }],
            system_instruction: request.system.as_ref().map(|system| Content {
                role: None,
                parts: vec![Part {
                    text: system.clone(),
                }],
            }),
            tools: vec![Tool {
                file_search: FileSearch {
                    file_search_store_names: vec![request.index_id.clone()],
                },
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        }
    }

    /// Convert a Gemini response to a SearchResponse.
    ///
    /// Only the first candidate is read. Its non-thought text parts form the
    /// answer; its grounding chunks become the citations' raw material.
    fn convert_response(&self, response: GenerateContentResponse, model: &str) -> SearchResponse {
        let usage = response
            .usage_metadata
            .map(|u| {
                SearchUsage::new(
                    u.prompt_token_count.unwrap_or(0),
                    u.candidates_token_count.unwrap_or(0),
                )
            })
            .unwrap_or_default();

        let model = response.model_version.unwrap_or_else(|| model.to_string());

        let Some(candidate) = response.candidates.into_iter().next() else {
            return SearchResponse {
                answer: None,
                grounding: Vec::new(),
                model,
                usage,
            };
        };

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| part.thought != Some(true))
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        let grounding = candidate
            .grounding_metadata
            .map(|metadata| {
                metadata
                    .grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| chunk.retrieved_context)
                    .map(|context| GroundingChunk {
                        title: context.title,
                        uri: context.uri,
                        text: context.text,
                        score: None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        SearchResponse {
            answer: if text.is_empty() { None } else { Some(text) },
            grounding,
            model,
            usage,
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::ExternalService(format!(
                "Gemini request timed out after {}s",
                self.timeout.as_secs_f32()
            ))
        } else if err.is_connect() {
            AppError::ExternalService(format!("Failed to connect to Gemini: {}", err))
        } else {
            AppError::ExternalService(format!("Gemini request failed: {}", err))
        }
    }
}

/// Extract the service's own message from a non-success body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) => format!("{}: {}", status, envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait::async_trait]
impl FileSearchClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn search(&self, request: &SearchRequest) -> AppResult<SearchResponse> {
        tracing::info!(index = %request.index_id, model = %request.model, "Sending file search request to Gemini");
        tracing::debug!("Question: {}", request.question);

        let wire_request = self.to_wire_request(request);

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(AppError::ExternalService(format!(
                "Gemini API error ({}): {}",
                status,
                error_message(&body)
            )));
        }

        let wire_response: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::ExternalService(format!("Failed to parse Gemini response: {}", e))
        })?;

        let response = self.convert_response(wire_response, &request.model);

        tracing::info!(
            grounding_chunks = response.grounding.len(),
            total_tokens = response.usage.total_tokens,
            "Received answer from Gemini"
        );

        Ok(response)
    }
}
