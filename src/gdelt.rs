use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use crate::error::{AppError, Result};
use crate::query::SearchSpec;

pub const MAX_RECORDS: u32 = 50;

// The DOC API throttles clients that do not look like a browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/115.0.0.0 Safari/537.36";

static BROWSER_HEADERS: Lazy<HeaderMap> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers
});

/// One entry of an `artlist` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub seendate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcecountry: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArticleSet {
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl ArticleSet {
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// The set as the text handed to the summarizer.
    pub fn to_prompt_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Articles(ArticleSet),
    /// 200, but the body was not an article list.
    UnparsableBody(String),
    /// 200 with a well-formed but empty result.
    Empty,
    /// Any non-200 status.
    Status(u16),
}

impl FetchOutcome {
    pub fn into_result(self) -> Result<ArticleSet> {
        match self {
            FetchOutcome::Articles(set) => Ok(set),
            FetchOutcome::UnparsableBody(body) => Err(AppError::UnparsableArticles(body)),
            FetchOutcome::Empty => Err(AppError::NoArticles),
            FetchOutcome::Status(code) => Err(AppError::ArticleStatus(code)),
        }
    }
}

/// Query parameters for an article-list search.
pub fn search_params(spec: &SearchSpec) -> Vec<(&'static str, String)> {
    vec![
        ("query", spec.query.clone()),
        ("startdatetime", spec.start_date.midnight_timestamp()),
        ("enddatetime", spec.end_date.midnight_timestamp()),
        ("mode", "artlist".to_string()),
        ("format", "json".to_string()),
        ("maxrecords", MAX_RECORDS.to_string()),
        ("sort", "hybridrel".to_string()),
    ]
}

/// Classifies a response body received with a 200 status.
pub fn parse_articles(body: &str) -> FetchOutcome {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return FetchOutcome::UnparsableBody(body.to_string()),
    };
    if !value.is_object() {
        return FetchOutcome::UnparsableBody(body.to_string());
    }

    match serde_json::from_value::<ArticleSet>(value) {
        Ok(set) if set.is_empty() => FetchOutcome::Empty,
        Ok(set) => FetchOutcome::Articles(set),
        Err(_) => FetchOutcome::UnparsableBody(body.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct GdeltClient {
    client: Client,
    endpoint: String,
}

impl GdeltClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Runs one search. Transport failures are errors; HTTP and body
    /// problems come back as [`FetchOutcome`] variants.
    pub async fn fetch_articles(&self, spec: &SearchSpec) -> Result<FetchOutcome> {
        let response = self
            .client
            .get(&self.endpoint)
            .headers(BROWSER_HEADERS.clone())
            .query(&search_params(spec))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "article search rejected");
            return Ok(FetchOutcome::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(parse_articles(&body))
    }
}
