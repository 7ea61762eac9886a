//! Search provider factory.
//!
//! Creates the configured search client, injecting the API credential and
//! request timeout.

use crate::client::FileSearchClient;
use crate::providers::{GeminiClient, MockClient};
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;

/// Create a search client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "mock")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required by "gemini")
/// * `timeout` - Request timeout for the external call
///
/// # Errors
/// Returns error if the provider is unknown, a required secret is missing,
/// or the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn FileSearchClient>, String> {
    match ProviderType::parse(provider) {
        Some(ProviderType::Gemini) => {
            let api_key = api_key.ok_or_else(|| "Gemini provider requires API key".to_string())?;
            let base_url = endpoint.unwrap_or(crate::providers::gemini::DEFAULT_BASE_URL);
            let client = GeminiClient::with_options(base_url, api_key, timeout)
                .map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        Some(ProviderType::Mock) => Ok(Arc::new(MockClient::offline())),
        None => Err(format!("Unknown provider: {}", provider)),
    }
}
