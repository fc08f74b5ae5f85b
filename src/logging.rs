use std::io;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,world_news_summarizer=debug";

/// Installs the stdout subscriber. `RUST_LOG` overrides the default filter.
pub fn configure_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stdout_log = fmt::layer()
        .with_writer(io::stdout)
        .with_target(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(stdout_log).init();
}
