//! Citation extraction and grouping.

use crate::catalog::DocumentCatalog;
use crate::text::truncate;
use crate::types::{Citation, SourceType};
use krepo_search::GroundingChunk;
use serde::Serialize;
use std::collections::HashSet;

/// Maximum graphemes of retrieved text kept on a citation.
const MAX_SNIPPET_LENGTH: usize = 500;

/// Relevance score assumed when the service reports none.
const DEFAULT_SCORE: f32 = 1.0;

/// Map grounding chunks to citations.
///
/// Chunks are resolved through the catalog and deduplicated by raw id,
/// keeping the first occurrence.
pub fn extract_citations(grounding: &[GroundingChunk], catalog: &DocumentCatalog) -> Vec<Citation> {
    let mut seen = HashSet::new();
    let mut citations = Vec::new();

    for chunk in grounding {
        let raw_id = chunk.raw_id();
        if !seen.insert(raw_id.clone()) {
            continue;
        }

        let resolved = catalog.resolve(&raw_id);
        let snippet = chunk
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(|text| truncate(text, MAX_SNIPPET_LENGTH).to_string());

        citations.push(Citation {
            title: resolved.display_name,
            locator: resolved.original_url,
            snippet,
            raw_id,
            source_type: resolved.source_type,
            date: resolved.date,
            score: chunk.score.unwrap_or(DEFAULT_SCORE),
        });
    }

    tracing::debug!(
        "Extracted {} citations from {} grounding chunks",
        citations.len(),
        grounding.len()
    );

    citations
}

/// Citations sharing one source type, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationGroup {
    #[serde(rename = "sourceType")]
    pub source_type: SourceType,

    pub label: &'static str,

    pub icon: &'static str,

    pub citations: Vec<Citation>,
}

/// Drop citations whose display title was already seen.
pub fn dedupe_by_title(citations: &[Citation]) -> Vec<Citation> {
    let mut seen = HashSet::new();
    citations
        .iter()
        .filter(|c| seen.insert(c.title.as_str()))
        .cloned()
        .collect()
}

/// Group citations by source type in order of first appearance.
pub fn group_by_source_type(citations: &[Citation]) -> Vec<CitationGroup> {
    let mut groups: Vec<CitationGroup> = Vec::new();

    for citation in citations {
        match groups
            .iter_mut()
            .find(|g| g.source_type == citation.source_type)
        {
            Some(group) => group.citations.push(citation.clone()),
            None => groups.push(CitationGroup {
                source_type: citation.source_type,
                label: citation.source_type.label(),
                icon: citation.source_type.icon(),
                citations: vec![citation.clone()],
            }),
        }
    }

    groups
}
