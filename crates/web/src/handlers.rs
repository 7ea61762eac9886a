//! HTTP handlers.

use crate::error::ApiError;
use crate::page::{knowledge_base_options, KnowledgeBaseOption};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Html;
use axum::Json;
use krepo_knowledge::text::ellipsize;
use krepo_knowledge::{
    dedupe_by_title, group_by_source_type, Citation, CitationGroup, KnowledgeBase, Query,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Maximum graphemes of a snippet shown in the page.
const PAGE_SNIPPET_LENGTH: usize = 300;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,

    #[serde(rename = "knowledgeBase", default)]
    pub knowledge_base: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub status: &'static str,
    pub knowledge_base: KnowledgeBase,
    pub knowledge_base_name: &'static str,
    pub answer: String,
    pub linked_answer: String,
    pub empty_answer: bool,
    pub latency_ms: u64,
    pub citations: Vec<Citation>,
    pub citation_groups: Vec<CitationGroup>,
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let html = state
        .page
        .render(state.router.provider_name(), state.router.model())?;
    Ok(Html(html))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn knowledge_bases() -> Json<Vec<KnowledgeBaseOption>> {
    Json(knowledge_base_options())
}

pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let kb = match request.knowledge_base.as_deref().filter(|key| !key.is_empty()) {
        Some(key) => key.parse::<KnowledgeBase>()?,
        None => KnowledgeBase::default(),
    };

    // Blank questions are rejected whether or not another one is pending
    Query::new(request.question.as_str(), kb)?;

    let _permit = state.try_begin_question().ok_or(ApiError::Busy)?;

    let start = Instant::now();
    let result = state.router.ask(&request.question, kb).await?;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let linked_answer = state.laws.linkify(&result.answer);

    let shown: Vec<Citation> = dedupe_by_title(&result.citations)
        .into_iter()
        .map(|mut citation| {
            citation.snippet = citation
                .snippet
                .map(|snippet| ellipsize(&snippet, PAGE_SNIPPET_LENGTH));
            citation
        })
        .collect();

    Ok(Json(AskResponse {
        status: "ok",
        knowledge_base: kb,
        knowledge_base_name: kb.display_name(),
        empty_answer: result.is_empty(),
        answer: result.answer,
        linked_answer,
        latency_ms,
        citation_groups: group_by_source_type(&shown),
        citations: result.citations,
    }))
}
