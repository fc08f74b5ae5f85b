use crate::error::{AppError, Result};
use crate::gdelt::ArticleSet;
use crate::llm::{ChatMessage, ChatModel};

pub const MIN_RECOMMENDATIONS: usize = 1;
pub const MAX_RECOMMENDATIONS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    Summary(String),
    /// The reply carried no text block; the raw body is kept.
    MissingText(serde_json::Value),
}

impl SummaryOutcome {
    pub fn into_result(self) -> Result<String> {
        match self {
            SummaryOutcome::Summary(text) if text.trim().is_empty() => Err(AppError::EmptySummary),
            SummaryOutcome::Summary(text) => Ok(text),
            SummaryOutcome::MissingText(raw) => Err(AppError::MissingSummary(raw.to_string())),
        }
    }
}

pub fn build_summary_prompt(question: &str, language: &str) -> String {
    format!(
        r#"
The user will give you a list of articles from GDELT including the URL, Date and Title.
The user has previously asked:
{question}
Respond with a brief summary responding to the users previous question.
Base your response only on the information from the given articles.
Recommend the user between {min} and {max} most relevant articles including the URLs and titles. Translate the titles to {language} if necessary.
Respond only with the summary and recommended articles.
"#,
        question = question,
        min = MIN_RECOMMENDATIONS,
        max = MAX_RECOMMENDATIONS,
        language = language,
    )
}

/// Asks the model to answer `question` from `articles` alone.
pub async fn summarize(
    model: &dyn ChatModel,
    question: &str,
    articles: &ArticleSet,
    language: &str,
) -> Result<SummaryOutcome> {
    let messages = vec![
        ChatMessage::system(build_summary_prompt(question, language)),
        ChatMessage::user(articles.to_prompt_text()),
    ];

    let reply = model.chat(messages).await?;
    Ok(match reply.text() {
        Some(text) => SummaryOutcome::Summary(text.to_string()),
        None => SummaryOutcome::MissingText(reply.into_value()),
    })
}
