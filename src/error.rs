use std::fmt;

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde::Serialize;

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Please enter a valid question to proceed")]
    InvalidQuestion,

    #[error("LLM processing error: {0}")]
    Llm(String),

    #[error("Failed to fetch data: {0}")]
    Fetch(String),

    #[error("Query not found")]
    QueryNotFound,

    #[error("Invalid or missing query. Response: {0}")]
    MalformedQuery(String),

    #[error("Article search returned status {0}")]
    ArticleStatus(u16),

    #[error("Invalid article search response: {0}")]
    UnparsableArticles(String),

    #[error("No articles matched the query")]
    NoArticles,

    #[error("Invalid or missing summary. Response: {0}")]
    MissingSummary(String),

    #[error("The model returned an empty summary")]
    EmptySummary,

    #[error("Failed to render report: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidQuestion => StatusCode::BAD_REQUEST,
            AppError::QueryNotFound | AppError::NoArticles => StatusCode::NOT_FOUND,
            AppError::MalformedQuery(_)
            | AppError::UnparsableArticles(_)
            | AppError::MissingSummary(_)
            | AppError::EmptySummary => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Llm(_) | AppError::Fetch(_) | AppError::ArticleStatus(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Render(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch(err.to_string())
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<genpdf::error::Error> for AppError {
    fn from(err: genpdf::error::Error) -> Self {
        AppError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Pipeline step that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Question,
    QueryDerivation,
    ArticleFetch,
    Summarization,
    Report,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Question => "question",
            Stage::QueryDerivation => "query_derivation",
            Stage::ArticleFetch => "article_fetch",
            Stage::Summarization => "summarization",
            Stage::Report => "report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An [`AppError`] tagged with the stage that halted the pipeline.
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: AppError,
}

impl StageError {
    pub fn new(stage: Stage, source: AppError) -> Self {
        Self { stage, source }
    }
}

/// Tags a stage result with the stage that produced it.
pub trait AtStage<T> {
    fn at_stage(self, stage: Stage) -> std::result::Result<T, StageError>;
}

impl<T> AtStage<T> for Result<T> {
    fn at_stage(self, stage: Stage) -> std::result::Result<T, StageError> {
        self.map_err(|source| StageError::new(stage, source))
    }
}

/// Same `ApiResponse` envelope the JSON endpoints use, with no data.
impl IntoResponse for StageError {
    fn into_response(self) -> Response {
        response::stage_error::<()>(&self).into_response()
    }
}
