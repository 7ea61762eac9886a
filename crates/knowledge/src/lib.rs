//! Knowledge base routing for krepo.
//!
//! Holds the four curated knowledge bases and everything needed to ask one
//! of them a question through the hosted document-search service:
//! - [`KnowledgeBaseRegistry`]: knowledge base -> external index
//! - [`QueryRouter`]: one scoped request per question
//! - [`DocumentCatalog`]: readable citations from returned file ids
//! - [`LawCatalog`]: statute names linked to the national law database
//!
//! Retrieval and ranking happen entirely inside the external service.

pub mod catalog;
pub mod citations;
pub mod laws;
pub mod registry;
pub mod router;
pub mod text;
pub mod types;

// Re-export commonly used types
pub use catalog::{DocumentCatalog, DocumentEntry, ResolvedDocument};
pub use citations::{dedupe_by_title, extract_citations, group_by_source_type, CitationGroup};
pub use laws::LawCatalog;
pub use registry::KnowledgeBaseRegistry;
pub use router::QueryRouter;
pub use types::{
    AnswerResult, Citation, KnowledgeBase, KnowledgeBaseHandle, KnowledgeGroup, Query, SourceType,
};
