//! API routes for the report Q&A server

pub mod chat;
pub mod reports;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Upload - with larger body limit for report files
        .route(
            "/upload/",
            post(upload::upload_report).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/chat/", post(chat::chat))
        .route("/reports/latest", get(reports::latest_report))
}
