//! Ask command handler.
//!
//! Sends one question to a knowledge base and prints the answer with its
//! citations.

use clap::Args;
use krepo_core::{config::AppConfig, AppError, AppResult};
use krepo_knowledge::{AnswerResult, KnowledgeBase, LawCatalog, QueryRouter};
use std::path::PathBuf;

/// Ask one question and print the answer
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Knowledge base key (labor_faq, labor_articles, tax_faq, law_articles)
    #[arg(short, long = "kb", default_value = "labor_faq")]
    pub knowledge_base: KnowledgeBase,

    /// Turn statute names in the answer into law database links
    #[arg(long)]
    pub links: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.get_question()?;

        config.validate()?;
        let router = QueryRouter::from_config(config)?;

        let result = router.ask(&question, self.knowledge_base).await?;

        let answer = if self.links {
            LawCatalog::load(&config.law_mapping_path()).linkify(&result.answer)
        } else {
            result.answer.clone()
        };

        if self.json {
            self.print_json(&result, &answer, config)
        } else {
            self.print_text(&result, &answer);
            Ok(())
        }
    }

    /// Question from the positional argument or `--file`.
    ///
    /// Blank text is passed through so the router reports it as an empty query.
    fn get_question(&self) -> AppResult<String> {
        if let Some(ref question) = self.question {
            return Ok(question.clone());
        }

        if let Some(ref path) = self.file {
            return std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("Failed to read question file {:?}: {}", path, e))
            });
        }

        Err(AppError::EmptyQuery)
    }

    fn print_json(&self, result: &AnswerResult, answer: &str, config: &AppConfig) -> AppResult<()> {
        let output = serde_json::json!({
            "knowledgeBase": self.knowledge_base,
            "answer": answer,
            "emptyAnswer": result.is_empty(),
            "citations": result.citations,
            "provider": config.provider,
            "model": config.model,
        });

        let json = serde_json::to_string_pretty(&output)?;
        println!("{}", json);

        Ok(())
    }

    fn print_text(&self, result: &AnswerResult, answer: &str) {
        if result.is_empty() {
            eprintln!("⚠️ 查詢未能取得有效回答，請嘗試換個方式描述您的問題。");
        } else {
            println!("{}", answer.trim_end());
        }

        if result.citations.is_empty() {
            return;
        }

        println!();
        println!("📚 參考來源 ({} 筆)", result.citations.len());
        for citation in &result.citations {
            match &citation.locator {
                Some(url) => println!("  - {} <{}>", citation.title, url),
                None => println!("  - {}", citation.title),
            }
        }
    }
}
