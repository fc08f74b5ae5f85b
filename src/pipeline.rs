use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::dates::{Clock, SystemClock};
use crate::error::{AppError, AtStage, Stage, StageError};
use crate::gdelt::{ArticleSet, GdeltClient};
use crate::llm::{ChatModel, CohereClient};
use crate::query::{self, SearchSpec};
use crate::report::{self, DocumentRenderer};
use crate::summary;

/// Everything a successful run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsBriefing {
    pub question: String,
    pub search: SearchSpec,
    pub articles: ArticleSet,
    pub summary: String,
}

/// Question → search parameters → articles → summary, halting at the
/// first stage whose output does not validate.
pub struct NewsPipeline {
    model: Arc<dyn ChatModel>,
    gdelt: GdeltClient,
    clock: Arc<dyn Clock>,
    summary_language: String,
}

impl NewsPipeline {
    pub fn new(
        model: Arc<dyn ChatModel>,
        gdelt: GdeltClient,
        clock: Arc<dyn Clock>,
        summary_language: impl Into<String>,
    ) -> Self {
        Self {
            model,
            gdelt,
            clock,
            summary_language: summary_language.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(CohereClient::from_config(config)),
            GdeltClient::new(&config.gdelt_url),
            Arc::new(SystemClock),
            &config.summary_language,
        )
    }

    pub async fn run(&self, question: &str) -> Result<NewsBriefing, StageError> {
        let question = validate_question(question).at_stage(Stage::Question)?;
        tracing::info!("question received");

        tracing::info!("transforming query");
        let search = query::derive_search_spec(self.model.as_ref(), self.clock.as_ref(), question)
            .await
            .and_then(|outcome| outcome.into_result())
            .at_stage(Stage::QueryDerivation)
            .inspect_err(|e| tracing::warn!(error = %e, "query derivation failed"))?;
        tracing::info!(
            query = %search.query,
            startdate = %search.start_date,
            enddate = %search.end_date,
            "search parameters derived"
        );

        tracing::info!("fetching articles");
        let articles = self
            .gdelt
            .fetch_articles(&search)
            .await
            .and_then(|outcome| outcome.into_result())
            .at_stage(Stage::ArticleFetch)
            .inspect_err(|e| tracing::warn!(error = %e, "article fetch failed"))?;
        tracing::info!(count = articles.len(), "articles retrieved");

        tracing::info!("generating summary");
        let summary = summary::summarize(self.model.as_ref(), question, &articles, &self.summary_language)
            .await
            .and_then(|outcome| outcome.into_result())
            .at_stage(Stage::Summarization)
            .inspect_err(|e| tracing::warn!(error = %e, "summarization failed"))?;
        tracing::info!(chars = summary.len(), "summary generated");

        Ok(NewsBriefing {
            question: question.to_string(),
            search,
            articles,
            summary,
        })
    }
}

/// Renders the downloadable document for a finished briefing.
pub fn render_briefing(
    renderer: &dyn DocumentRenderer,
    question: &str,
    summary: &str,
) -> Result<Vec<u8>, StageError> {
    let question = validate_question(question).at_stage(Stage::Question)?;
    if summary.trim().is_empty() {
        return Err(StageError::new(Stage::Report, AppError::EmptySummary));
    }
    report::render_report(renderer, question, summary).at_stage(Stage::Report)
}

/// Rejects blank questions. Accepted questions pass through verbatim.
fn validate_question(question: &str) -> crate::error::Result<&str> {
    if question.trim().is_empty() {
        return Err(AppError::InvalidQuestion);
    }
    Ok(question)
}
