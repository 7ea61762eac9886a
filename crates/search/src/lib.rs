//! Document-search client crate for krepo.
//!
//! This crate wraps the hosted document-search service behind a
//! provider-agnostic trait. The service owns indexing, retrieval, relevance
//! scoring and answer synthesis; this side only builds a scoped request and
//! reads back the answer text and its grounding chunks.
//!
//! # Providers
//! - **Gemini**: Gemini File Search (`generateContent` with the `fileSearch` tool)
//! - **Mock**: canned responses for tests and offline demos
//!
//! # Example
//! ```no_run
//! use krepo_search::{FileSearchClient, SearchRequest, providers::GeminiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("my-api-key")?;
//! let request = SearchRequest::new(
//!     "資遣費如何計算？",
//!     "fileSearchStores/krepolaborfaqv2-knbagjg20f9k",
//!     "gemini-2.5-flash",
//! );
//! let response = client.search(&request).await?;
//! println!("{}", response.answer.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{FileSearchClient, GroundingChunk, SearchRequest, SearchResponse, SearchUsage};
pub use factory::create_client;
pub use providers::{GeminiClient, MockClient};
pub use types::{GenerationSettings, ProviderType};
