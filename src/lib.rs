pub mod api;
pub mod config;
pub mod dates;
pub mod error;
pub mod gdelt;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod summary;

use std::sync::Arc;
use config::Config;
use pipeline::NewsPipeline;
use report::{DocumentRenderer, GenPdfRenderer};

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<NewsPipeline>,
    pub renderer: Arc<dyn DocumentRenderer>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            pipeline: Arc::new(NewsPipeline::from_config(config)),
            renderer: Arc::new(GenPdfRenderer::from_config(config)),
        }
    }
}
