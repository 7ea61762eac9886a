//! Document catalog.
//!
//! Maps the file identifiers the search service reports back to the
//! documents they were uploaded from. Each mapping file under
//! `<data_dir>/mappings/` is a JSON object keyed by document id.

use crate::text::{ellipsize, truncate};
use crate::types::SourceType;
use krepo_core::AppResult;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

/// Maximum graphemes of a document title shown in a citation.
const MAX_TITLE_LENGTH: usize = 40;

/// Graphemes of an unresolved identifier shown in a citation.
const UNRESOLVED_ID_LENGTH: usize = 30;

/// Date label used when a document has none.
pub const UNKNOWN_DATE: &str = "未知日期";

/// One uploaded document, as recorded in a mapping file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentEntry {
    #[serde(default)]
    pub gemini_file_id: String,

    #[serde(default)]
    pub store_id: String,

    /// Crawl source tag (e.g., "mol_faq")
    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub original_url: String,
}

/// How a raw identifier should be presented.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDocument {
    pub display_name: String,
    pub source_type: SourceType,
    pub date: Option<String>,
    pub original_url: Option<String>,
}

/// Lookup tables built from the mapping files.
#[derive(Debug, Clone, Default)]
pub struct DocumentCatalog {
    /// doc id -> entry
    documents: HashMap<String, DocumentEntry>,

    /// short file id (without "files/") -> doc id
    file_ids: HashMap<String, String>,
}

impl DocumentCatalog {
    /// Load every `*.json` mapping file in `dir`.
    ///
    /// A missing directory yields an empty catalog. Unreadable or malformed
    /// files are skipped with a warning.
    pub fn load_dir(dir: &Path) -> AppResult<Self> {
        let mut catalog = Self::default();

        if !dir.is_dir() {
            tracing::warn!("Mapping directory {:?} not found, citations will show raw ids", dir);
            return Ok(catalog);
        }

        let mut files: Vec<_> = WalkDir::new(dir)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .collect();
        files.sort();

        for path in files {
            let contents = match std::fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(e) => {
                    tracing::warn!("Skipping mapping file {:?}: {}", path, e);
                    continue;
                }
            };

            match serde_json::from_str::<HashMap<String, DocumentEntry>>(&contents) {
                Ok(entries) => {
                    tracing::debug!("Loaded {} documents from {:?}", entries.len(), path);
                    catalog.extend(entries);
                }
                Err(e) => tracing::warn!("Skipping malformed mapping file {:?}: {}", path, e),
            }
        }

        tracing::info!("Document catalog loaded: {} documents", catalog.len());

        Ok(catalog)
    }

    /// Add entries keyed by document id.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, DocumentEntry)>) {
        for (doc_id, entry) in entries {
            if !entry.gemini_file_id.is_empty() {
                let short_id = short_file_id(&entry.gemini_file_id).to_string();
                self.file_ids.insert(short_id, doc_id.clone());
            }
            self.documents.insert(doc_id, entry);
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Find an entry by document id, then by short file id.
    pub fn lookup(&self, raw_id: &str) -> Option<&DocumentEntry> {
        self.documents.get(raw_id).or_else(|| {
            self.file_ids
                .get(short_file_id(raw_id))
                .and_then(|doc_id| self.documents.get(doc_id))
        })
    }

    /// Resolve a raw identifier to its display form.
    pub fn resolve(&self, raw_id: &str) -> ResolvedDocument {
        let Some(entry) = self.lookup(raw_id) else {
            return ResolvedDocument {
                display_name: format!("📄 {}...", truncate(raw_id, UNRESOLVED_ID_LENGTH)),
                source_type: SourceType::Unknown,
                date: Some(UNKNOWN_DATE.to_string()),
                original_url: None,
            };
        };

        let source_type = SourceType::classify(&entry.source);
        let date = non_empty(&entry.date);

        let display_name = if entry.title.is_empty() {
            format!(
                "{} {}_{}",
                source_type.icon(),
                source_type.label(),
                date.as_deref().unwrap_or(UNKNOWN_DATE)
            )
        } else {
            format!("{} {}", source_type.icon(), ellipsize(&entry.title, MAX_TITLE_LENGTH))
        };

        ResolvedDocument {
            display_name,
            source_type,
            date,
            original_url: non_empty(&entry.original_url),
        }
    }
}

fn short_file_id(id: &str) -> &str {
    id.strip_prefix("files/").unwrap_or(id)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
