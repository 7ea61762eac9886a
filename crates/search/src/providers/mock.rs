//! Mock search provider returning canned responses.

use crate::client::{FileSearchClient, SearchRequest, SearchResponse};
use krepo_core::{AppError, AppResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What the mock answers with.
#[derive(Debug, Clone)]
enum Reply {
    Response(SearchResponse),
    ExternalError(String),
}

/// Mock provider for testing and offline development.
///
/// Returns the same response (or error) for every request, optionally after
/// a delay, and records each request it receives so tests can assert on
/// call counts and routing. The offline client keeps counters only.
#[derive(Debug)]
pub struct MockClient {
    reply: Reply,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    record_requests: bool,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockClient {
    /// Answer every request with the given response.
    pub fn with_response(response: SearchResponse) -> Self {
        Self::from_reply(Reply::Response(response))
    }

    /// Answer every request with the given answer text and no grounding.
    pub fn with_answer(answer: impl Into<String>) -> Self {
        Self::with_response(SearchResponse {
            answer: Some(answer.into()),
            model: "mock".to_string(),
            ..Default::default()
        })
    }

    /// Fail every request with an external-service error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::from_reply(Reply::ExternalError(message.into()))
    }

    /// Canned reply used by the `mock` provider in offline demos.
    ///
    /// Serves for the life of the process, so requests are not recorded.
    pub fn offline() -> Self {
        let mut client = Self::with_answer(
            "（離線模式）目前未連線至文件搜尋服務，此為示範回覆。請設定 GEMINI_API_KEY 後重新啟動。",
        );
        client.record_requests = false;
        client
    }

    /// Wait for `delay` before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn from_reply(reply: Reply) -> Self {
        Self {
            reply,
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            record_requests: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of `search` calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of overlapping `search` calls observed.
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Requests received so far, in arrival order. Always empty for the
    /// offline client.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl FileSearchClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn search(&self, request: &SearchRequest) -> AppResult<SearchResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.record_requests {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        tracing::debug!(index = %request.index_id, "Mock search answered");

        match &self.reply {
            Reply::Response(response) => Ok(response.clone()),
            Reply::ExternalError(message) => Err(AppError::ExternalService(message.clone())),
        }
    }
}
