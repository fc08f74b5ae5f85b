//! Turns a free-text question into news search parameters.
//!
//! The model is asked for a `{query, startdate, enddate}` object. Its reply
//! may arrive fenced in a markdown json block; a reply that does not decode
//! into that shape is reported as [`DeriveOutcome::MalformedResponse`]
//! rather than as an error. Missing dates are filled in relative to the
//! injected [`Clock`].

use serde::{Deserialize, Serialize};

use crate::dates::{Clock, Date8};
use crate::error::{AppError, Result};
use crate::llm::{ChatMessage, ChatModel};

/// Placeholder the model uses for anything it cannot determine.
pub const NOT_AVAILABLE: &str = "N/A";

/// Default search window, in days, when a start date is missing.
pub const DEFAULT_WINDOW_DAYS: u64 = 7;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Normalized parameters for the article search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpec {
    pub query: String,
    #[serde(rename = "startdate")]
    pub start_date: Date8,
    #[serde(rename = "enddate")]
    pub end_date: Date8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeriveOutcome {
    Derived(SearchSpec),
    /// The model answered "N/A" for the query.
    QueryNotFound,
    /// Reply text that did not decode into the expected object.
    MalformedResponse(String),
}

impl DeriveOutcome {
    pub fn into_result(self) -> Result<SearchSpec> {
        match self {
            DeriveOutcome::Derived(spec) => Ok(spec),
            DeriveOutcome::QueryNotFound => Err(AppError::QueryNotFound),
            DeriveOutcome::MalformedResponse(raw) => Err(AppError::MalformedQuery(raw)),
        }
    }
}

/// A date field as the model wrote it: a string (possibly "N/A") or a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Number(u64),
}

#[derive(Debug, Deserialize)]
struct RawSearchFields {
    query: String,
    startdate: RawDate,
    enddate: RawDate,
}

/// A date that is either known or explicitly unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Known(Date8),
    Missing,
}

/// Decoded model reply, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFields {
    pub query: String,
    pub start: DateField,
    pub end: DateField,
}

pub fn build_query_prompt(today: Date8) -> String {
    format!(
        r#"
The user will write a text asking for news about a topic during a period.
Extract the information necessary to populate this json object:
{{
"query": X,
"startdate": X,
"enddate": X
}}
The query should include a certain action (e.g. "terror" or "protest") and region (e.g. "france" or "paris"). It is intended for the GDELT API.
The startdate and enddate should be in the format YYYYMMDD. Remember that today is {today}.
If the information is not present, return "{na}".
Respond only with the json object.
"#,
        today = today,
        na = NOT_AVAILABLE,
    )
}

/// Returns the body of the first markdown block labelled `json`, or `None`
/// when the text has no such opening marker or the block is empty. An
/// unterminated block runs to the end of the text.
pub fn strip_json_fence(text: &str) -> Option<&str> {
    let open = text.find(JSON_FENCE)?;
    let after_marker = &text[open + JSON_FENCE.len()..];
    // Only word characters extend the label; the body may share its line.
    let label_end = after_marker
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(after_marker.len());
    let body = &after_marker[label_end..];
    let body = match body.find(FENCE) {
        Some(close) => &body[..close],
        None => body,
    };
    let body = body.trim();
    (!body.is_empty()).then_some(body)
}

fn date_field(raw: RawDate) -> Option<DateField> {
    let text = match raw {
        RawDate::Text(text) => text,
        RawDate::Number(n) => n.to_string(),
    };
    if text.trim() == NOT_AVAILABLE {
        return Some(DateField::Missing);
    }
    text.parse().ok().map(DateField::Known)
}

/// Decodes the model's reply, fenced or bare. On failure the payload text
/// (fence removed) is handed back for diagnostics.
pub fn parse_search_fields(reply: &str) -> std::result::Result<SearchFields, String> {
    let payload = strip_json_fence(reply).unwrap_or_else(|| reply.trim());

    let raw: RawSearchFields = serde_json::from_str(payload).map_err(|_| payload.to_string())?;

    let start = date_field(raw.startdate).ok_or_else(|| payload.to_string())?;
    let end = date_field(raw.enddate).ok_or_else(|| payload.to_string())?;

    Ok(SearchFields {
        query: raw.query,
        start,
        end,
    })
}

/// Fills in missing dates and repairs the window. Steps run in a fixed
/// order: missing dates first, then the same-day end, then an inverted
/// window.
pub fn normalize(fields: SearchFields, today: Date8) -> DeriveOutcome {
    let query = fields.query.trim();
    if query == NOT_AVAILABLE || query.is_empty() {
        return DeriveOutcome::QueryNotFound;
    }

    let yesterday = today.days_before(1);
    let (mut start, mut end) = match (fields.start, fields.end) {
        (DateField::Missing, DateField::Missing) => {
            (yesterday.days_before(DEFAULT_WINDOW_DAYS), yesterday)
        }
        (DateField::Missing, DateField::Known(end)) => (end.days_before(DEFAULT_WINDOW_DAYS), end),
        (DateField::Known(start), DateField::Missing) => (start, yesterday),
        (DateField::Known(start), DateField::Known(end)) => (start, end),
    };

    // The search API under-serves windows ending today.
    if end == today {
        end = yesterday;
    }
    if end < start {
        start = end.days_before(DEFAULT_WINDOW_DAYS);
    }

    DeriveOutcome::Derived(SearchSpec {
        query: query.to_string(),
        start_date: start,
        end_date: end,
    })
}

/// Asks the model for search parameters and normalizes its answer.
pub async fn derive_search_spec(
    model: &dyn ChatModel,
    clock: &dyn Clock,
    question: &str,
) -> Result<DeriveOutcome> {
    let today = clock.today();
    let messages = vec![
        ChatMessage::system(build_query_prompt(today)),
        ChatMessage::user(question),
    ];

    let reply = model.chat(messages).await?;
    let Some(text) = reply.text() else {
        return Ok(DeriveOutcome::MalformedResponse(reply.into_value().to_string()));
    };
    tracing::debug!(reply = %text, "query derivation reply");

    Ok(match parse_search_fields(text) {
        Ok(fields) => normalize(fields, today),
        Err(raw) => DeriveOutcome::MalformedResponse(raw),
    })
}
