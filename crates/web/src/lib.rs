//! Presentation shell for krepo.
//!
//! A single-page form over a small JSON API:
//! - `GET /` the form
//! - `GET /api/health` liveness
//! - `GET /api/knowledge-bases` selectable knowledge bases
//! - `POST /api/ask` one question, one answer
//!
//! Only one question is answered at a time; a submission arriving while
//! another is in flight is rejected with `409 busy`.

pub mod error;
pub mod handlers;
pub mod page;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use krepo_core::{AppError, AppResult};
use tower_http::trace::TraceLayer;

/// Build the HTTP application.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health))
        .route("/api/knowledge-bases", get(handlers::knowledge_bases))
        .route("/api/ask", post(handlers::ask))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    let local = listener.local_addr()?;
    tracing::info!("Listening on http://{}", local);

    axum::serve(listener, build_app(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use krepo_core::AppConfig;
    use krepo_knowledge::{DocumentCatalog, KnowledgeBaseRegistry, LawCatalog, QueryRouter};
    use krepo_search::{GroundingChunk, MockClient, SearchResponse};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn state_with(client: Arc<MockClient>) -> AppState {
        let registry = KnowledgeBaseRegistry::from_config(&AppConfig::default()).unwrap();
        let router = QueryRouter::new(
            client,
            registry,
            DocumentCatalog::default(),
            krepo_prompt::default_system_prompt().unwrap(),
            "gemini-2.5-flash",
        );
        let laws = LawCatalog::from_mapping([("勞動基準法".to_string(), "N0030001".to_string())]);
        AppState::new(router, laws).unwrap()
    }

    fn ask_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/ask")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_app(state_with(Arc::new(MockClient::with_answer("A"))));
        let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_index_page() {
        let app = build_app(state_with(Arc::new(MockClient::with_answer("A"))));
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("人資法規智能查詢"));
        assert!(html.contains("value=\"tax_faq\""));
    }

    #[tokio::test]
    async fn test_knowledge_bases_hide_index_ids() {
        let app = build_app(state_with(Arc::new(MockClient::with_answer("A"))));
        let req = Request::builder()
            .uri("/api/knowledge-bases")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        let body = json_body(res).await;
        let options = body.as_array().unwrap();
        assert_eq!(options.len(), 4);
        assert_eq!(options[1]["key"], "labor_articles");
        assert_eq!(options[1]["documentCount"], 626);
        assert!(!body.to_string().contains("fileSearchStores"));
    }

    #[tokio::test]
    async fn test_ask_success() {
        let client = Arc::new(MockClient::with_response(SearchResponse {
            answer: Some("依勞動基準法第24條計算。".to_string()),
            grounding: vec![GroundingChunk {
                title: Some("mol_faq_0001".to_string()),
                text: Some("加班費".repeat(200)),
                ..Default::default()
            }],
            ..Default::default()
        }));
        let app = build_app(state_with(client.clone()));

        let res = app
            .oneshot(ask_request(serde_json::json!({
                "question": "加班費要如何計算？",
                "knowledgeBase": "labor_faq"
            })))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["knowledgeBase"], "labor_faq");
        assert_eq!(body["answer"], "依勞動基準法第24條計算。");
        assert_eq!(
            body["linkedAnswer"],
            "依[勞動基準法第24條](https://law.moj.gov.tw/LawClass/LawSingle.aspx?pcode=N0030001&flno=24)計算。"
        );
        assert_eq!(body["emptyAnswer"], false);
        assert_eq!(body["citations"][0]["rawId"], "mol_faq_0001");

        let shown = body["citationGroups"][0]["citations"][0]["snippet"].as_str().unwrap();
        assert_eq!(shown.chars().count(), 303);
        assert!(shown.ends_with("..."));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_ask_defaults_to_labor_faq() {
        let client = Arc::new(MockClient::with_answer("A"));
        let app = build_app(state_with(client.clone()));

        let res = app
            .oneshot(ask_request(serde_json::json!({ "question": "資遣費如何計算？" })))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["knowledgeBase"], "labor_faq");
        assert_eq!(
            client.requests()[0].index_id,
            krepo_knowledge::KnowledgeBase::LaborFaq.default_index_id()
        );
    }

    #[tokio::test]
    async fn test_ask_empty_question() {
        let client = Arc::new(MockClient::with_answer("A"));
        let app = build_app(state_with(client.clone()));

        let res = app
            .oneshot(ask_request(serde_json::json!({ "question": "  ", "knowledgeBase": "tax_faq" })))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = json_body(res).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["kind"], "empty_query");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ask_unknown_knowledge_base() {
        let client = Arc::new(MockClient::with_answer("A"));
        let app = build_app(state_with(client.clone()));

        let res = app
            .oneshot(ask_request(serde_json::json!({ "question": "q", "knowledgeBase": "payroll" })))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(res).await["kind"], "configuration");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ask_external_failure_is_reported() {
        let client = Arc::new(MockClient::failing("Gemini request timed out after 60s"));
        let app = build_app(state_with(client));

        let res = app
            .clone()
            .oneshot(ask_request(serde_json::json!({ "question": "q" })))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(res).await;
        assert_eq!(body["kind"], "external_service");
        assert!(body["message"].as_str().unwrap().contains("timed out"));

        // The shell stays usable after a failure
        let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = build_app(state_with(Arc::new(MockClient::with_answer("A"))));
        let req = Request::builder()
            .method("POST")
            .uri("/api/ask")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["kind"], "invalid_request");
    }

    #[tokio::test]
    async fn test_overlapping_question_rejected() {
        let client = Arc::new(MockClient::with_answer("A").with_delay(Duration::from_millis(300)));
        let app = build_app(state_with(client.clone()));

        let first = tokio::spawn(
            app.clone()
                .oneshot(ask_request(serde_json::json!({ "question": "資遣費如何計算？" }))),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = app
            .clone()
            .oneshot(ask_request(serde_json::json!({ "question": "加班費要如何計算？" })))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(second).await["kind"], "busy");

        let first = first.await.unwrap().unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(client.call_count(), 1);
        assert_eq!(client.max_concurrent_calls(), 1);

        // Slot is released once the first answer is back
        let third = app
            .oneshot(ask_request(serde_json::json!({ "question": "職災補償有哪些項目？" })))
            .await
            .unwrap();
        assert_eq!(third.status(), StatusCode::OK);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_blank_question_while_busy_is_empty_query() {
        let client = Arc::new(MockClient::with_answer("A").with_delay(Duration::from_millis(300)));
        let app = build_app(state_with(client.clone()));

        let first = tokio::spawn(
            app.clone()
                .oneshot(ask_request(serde_json::json!({ "question": "資遣費如何計算？" }))),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;

        let blank = app
            .oneshot(ask_request(serde_json::json!({ "question": "   " })))
            .await
            .unwrap();
        assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(blank).await["kind"], "empty_query");

        let first = first.await.unwrap().unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(client.call_count(), 1);
    }
}
