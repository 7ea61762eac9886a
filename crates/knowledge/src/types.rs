//! Knowledge system type definitions.

use krepo_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four curated document collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KnowledgeBase {
    /// Labor-regulation FAQ (Ministry of Labor, Bureau of Labor Insurance, OSHA)
    #[default]
    #[serde(rename = "labor_faq")]
    LaborFaq,

    /// Labor and health-insurance operations notes
    #[serde(rename = "labor_articles")]
    LaborOperations,

    /// Individual income tax Q&A
    #[serde(rename = "tax_faq")]
    TaxFaq,

    /// Statutory text from the national law database
    #[serde(rename = "law_articles")]
    LawArticles,
}

/// Display grouping of knowledge bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeGroup {
    Labor,
    Tax,
    Law,
}

impl KnowledgeGroup {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Labor => "勞動法規",
            Self::Tax => "稅務",
            Self::Law => "法規條文",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Labor => "👷",
            Self::Tax => "💰",
            Self::Law => "📖",
        }
    }
}

impl KnowledgeBase {
    /// Every knowledge base, in display order.
    pub const ALL: [KnowledgeBase; 4] = [
        Self::LaborFaq,
        Self::LaborOperations,
        Self::TaxFaq,
        Self::LawArticles,
    ];

    /// Stable key used in config files, URLs and prompt guidelines.
    pub fn key(&self) -> &'static str {
        match self {
            Self::LaborFaq => "labor_faq",
            Self::LaborOperations => "labor_articles",
            Self::TaxFaq => "tax_faq",
            Self::LawArticles => "law_articles",
        }
    }

    /// Parse a knowledge base from its key.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kb| kb.key().eq_ignore_ascii_case(s.trim()))
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LaborFaq => "勞動法規FAQ",
            Self::LaborOperations => "勞動與健保業務",
            Self::TaxFaq => "稅務問答",
            Self::LawArticles => "法規條文",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::LaborFaq => "👷",
            Self::LaborOperations => "📋",
            Self::TaxFaq => "💰",
            Self::LawArticles => "📖",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::LaborFaq => "勞動部、勞保局、職安署常見問答",
            Self::LaborOperations => "勞動部業務專區、勞保局保險業務、健保投保說明",
            Self::TaxFaq => "綜合所得稅問與答",
            Self::LawArticles => "全民健康保險法等法規條文",
        }
    }

    pub fn group(&self) -> KnowledgeGroup {
        match self {
            Self::LaborFaq | Self::LaborOperations => KnowledgeGroup::Labor,
            Self::TaxFaq => KnowledgeGroup::Tax,
            Self::LawArticles => KnowledgeGroup::Law,
        }
    }

    /// Approximate number of indexed documents.
    pub fn document_count(&self) -> u32 {
        match self {
            Self::LaborFaq => 1691,
            Self::LaborOperations => 626,
            Self::TaxFaq => 318,
            Self::LawArticles => 561,
        }
    }

    /// Index identifier used when the config file does not override it.
    pub fn default_index_id(&self) -> &'static str {
        match self {
            Self::LaborFaq => "fileSearchStores/krepolaborfaqv2-knbagjg20f9k",
            Self::LaborOperations => "fileSearchStores/krepolaborarticlesv2-c0q9a9rfsmok",
            Self::TaxFaq => "fileSearchStores/krepotaxfaqv2-f7rnf4bjyo4f",
            Self::LawArticles => "fileSearchStores/krepolawarticlesv2-s6rfdsug6uvx",
        }
    }
}

impl fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for KnowledgeBase {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            AppError::Config(format!(
                "Unknown knowledge base: {}. Supported: {}",
                s,
                Self::ALL.map(|kb| kb.key()).join(", ")
            ))
        })
    }
}

/// A knowledge base bound to its external index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeBaseHandle {
    pub kb: KnowledgeBase,

    /// External index identifier (e.g., "fileSearchStores/...")
    #[serde(rename = "indexId")]
    pub index_id: String,
}

/// A validated user question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    question: String,
    kb: KnowledgeBase,
}

impl Query {
    /// Create a query, rejecting blank questions.
    pub fn new(question: impl Into<String>, kb: KnowledgeBase) -> AppResult<Self> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(AppError::EmptyQuery);
        }

        Ok(Self { question, kb })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn knowledge_base(&self) -> KnowledgeBase {
        self.kb
    }
}

/// Source category of a cited document, derived from its `source` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    MolFaq,
    BliFaq,
    OshaFaq,
    MolBusiness,
    BliInsurance,
    IncomeTax,
    HealthInsurancePremium,
    LawArticles,
    Unknown,
}

impl SourceType {
    /// Classify a mapping `source` tag.
    pub fn classify(source: &str) -> Self {
        const TAGS: [(&str, SourceType); 8] = [
            ("mol_faq", SourceType::MolFaq),
            ("bli_faq", SourceType::BliFaq),
            ("osha_faq", SourceType::OshaFaq),
            ("mol_business", SourceType::MolBusiness),
            ("bli_insurance", SourceType::BliInsurance),
            ("individual_income_tax", SourceType::IncomeTax),
            ("insurance_premium", SourceType::HealthInsurancePremium),
            ("law_articles", SourceType::LawArticles),
        ];

        TAGS.iter()
            .find(|(tag, _)| source.contains(tag))
            .map(|(_, kind)| *kind)
            .unwrap_or(SourceType::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MolFaq => "勞動部FAQ",
            Self::BliFaq => "勞保局FAQ",
            Self::OshaFaq => "職安署FAQ",
            Self::MolBusiness => "勞動部業務",
            Self::BliInsurance => "勞保局業務",
            Self::IncomeTax => "稅務問答",
            Self::HealthInsurancePremium => "健保業務",
            Self::LawArticles => "法規條文",
            Self::Unknown => "未知",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::MolFaq => "👷",
            Self::BliFaq => "🏢",
            Self::OshaFaq => "⚠️",
            Self::MolBusiness => "📋",
            Self::BliInsurance => "📄",
            Self::IncomeTax => "💰",
            Self::HealthInsurancePremium => "🏥",
            Self::LawArticles => "📖",
            Self::Unknown => "📄",
        }
    }
}

/// A reference to a source document returned alongside an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    /// Display title of the document
    pub title: String,

    /// Original web page of the document, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,

    /// Retrieved passage, truncated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,

    /// Identifier as returned by the search service
    #[serde(rename = "rawId")]
    pub raw_id: String,

    #[serde(rename = "sourceType")]
    pub source_type: SourceType,

    /// Publication date from the mapping, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    pub score: f32,
}

/// Answer text plus its ordered citations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnswerResult {
    pub answer: String,
    pub citations: Vec<Citation>,
}

impl AnswerResult {
    /// True when the service produced no usable answer text.
    pub fn is_empty(&self) -> bool {
        self.answer.trim().is_empty()
    }
}
