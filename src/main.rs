use tokio::net::TcpListener;
use world_news_summarizer::{
    config::Config,
    api::routes::create_router,
    logging::configure_logging,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    configure_logging();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    tracing::info!(?config, "configuration loaded");

    let app_state = AppState::from_config(&config);
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    tracing::info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
