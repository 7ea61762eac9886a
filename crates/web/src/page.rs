//! Server-rendered single-page form.

use handlebars::Handlebars;
use krepo_core::{AppError, AppResult};
use krepo_knowledge::{KnowledgeBase, KnowledgeGroup};
use serde::Serialize;

const INDEX_TEMPLATE: &str = include_str!("../assets/index.hbs");

pub const PAGE_TITLE: &str = "人資法規智能查詢";
pub const FOOTER: &str = "資料來源：意藍資訊勞動知識庫";

/// Questions offered as one-click examples.
pub const EXAMPLE_QUESTIONS: [&str; 6] = [
    "勞工退休金提繳率是多少？",
    "資遣費如何計算？",
    "育嬰留職停薪期間健保怎麼處理？",
    "加班費要如何計算？",
    "職災補償有哪些項目？",
    "扣繳憑單什麼時候要申報？",
];

const GROUP_ORDER: [KnowledgeGroup; 3] = [KnowledgeGroup::Labor, KnowledgeGroup::Tax, KnowledgeGroup::Law];

/// Knowledge base option as shown in the form and returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseOption {
    pub key: &'static str,
    pub display_name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub group: KnowledgeGroup,
    pub document_count: u32,
    pub default: bool,
}

impl From<KnowledgeBase> for KnowledgeBaseOption {
    fn from(kb: KnowledgeBase) -> Self {
        Self {
            key: kb.key(),
            display_name: kb.display_name(),
            icon: kb.icon(),
            description: kb.description(),
            group: kb.group(),
            document_count: kb.document_count(),
            default: kb == KnowledgeBase::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OptionGroup {
    label: &'static str,
    icon: &'static str,
    options: Vec<KnowledgeBaseOption>,
}

#[derive(Debug, Serialize)]
struct PageContext<'a> {
    title: &'a str,
    footer: &'a str,
    groups: Vec<OptionGroup>,
    examples: &'a [&'a str],
    provider: &'a str,
    model: &'a str,
}

/// All knowledge base options in display order.
pub fn knowledge_base_options() -> Vec<KnowledgeBaseOption> {
    KnowledgeBase::ALL.into_iter().map(KnowledgeBaseOption::from).collect()
}

/// Renders the index page.
#[derive(Debug)]
pub struct PageRenderer {
    handlebars: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> AppResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars
            .register_template_string("index", INDEX_TEMPLATE)
            .map_err(|e| AppError::Other(format!("Failed to register page template: {}", e)))?;

        Ok(Self { handlebars })
    }

    /// Render the form, noting which provider and model answer questions.
    pub fn render(&self, provider: &str, model: &str) -> AppResult<String> {
        let groups = GROUP_ORDER
            .into_iter()
            .map(|group| OptionGroup {
                label: group.label(),
                icon: group.icon(),
                options: knowledge_base_options()
                    .into_iter()
                    .filter(|option| option.group == group)
                    .collect(),
            })
            .collect();

        let context = PageContext {
            title: PAGE_TITLE,
            footer: FOOTER,
            groups,
            examples: &EXAMPLE_QUESTIONS,
            provider,
            model,
        };

        self.handlebars
            .render("index", &context)
            .map_err(|e| AppError::Other(format!("Failed to render page: {}", e)))
    }
}
