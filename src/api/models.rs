use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::pipeline::NewsBriefing;

#[derive(Deserialize)]
pub struct SummarizeRequest {
    pub question: String,
}

#[derive(Serialize)]
pub struct SummarizeResponse {
    #[serde(flatten)]
    pub briefing: NewsBriefing,
    pub article_count: usize,
    pub generated_at: DateTime<Utc>,
}

impl From<NewsBriefing> for SummarizeResponse {
    fn from(briefing: NewsBriefing) -> Self {
        Self {
            article_count: briefing.articles.len(),
            briefing,
            generated_at: Utc::now(),
        }
    }
}

#[derive(Deserialize)]
pub struct ReportRequest {
    pub question: String,
    pub summary: String,
}
