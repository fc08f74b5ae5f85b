use axum::{
    routing::{get, post},
    Router,
    extract::{Json, State},
    http::header,
    response::{IntoResponse, Response},
};
use tower_http::cors::{CorsLayer, Any};
use std::time::Instant;

use crate::api::models::{ReportRequest, SummarizeRequest, SummarizeResponse};
use crate::api::response;
use crate::error::{AppError, Stage, StageError};
use crate::pipeline::render_briefing;
use crate::report::REPORT_FILE_NAME;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/summarize", post(summarize_handler))
        .route("/api/report", post(report_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn summarize_handler(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> impl IntoResponse {
    let start_time = Instant::now();

    let result = state.pipeline.run(&req.question).await;
    let elapsed = start_time.elapsed();

    match result {
        Ok(briefing) => {
            tracing::info!(?elapsed, articles = briefing.articles.len(), "briefing ready");
            response::success(SummarizeResponse::from(briefing))
        }
        Err(err) => {
            tracing::warn!(?elapsed, stage = %err.stage, error = %err.source, "pipeline halted");
            response::stage_error(&err)
        }
    }
}

async fn report_handler(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Response, StageError> {
    let renderer = state.renderer.clone();
    let bytes = tokio::task::spawn_blocking(move || {
        render_briefing(renderer.as_ref(), &req.question, &req.summary)
    })
    .await
    .map_err(|e| StageError::new(Stage::Report, AppError::Render(e.to_string())))??;

    tracing::info!(bytes = bytes.len(), "report generated");

    let disposition = format!("attachment; filename=\"{}\"", REPORT_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
