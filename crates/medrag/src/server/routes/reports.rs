//! Report lookup endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::MessageResponse;

/// GET /reports/latest - Most recently stored report
pub async fn latest_report(State(state): State<AppState>) -> Result<Response> {
    let store = state.store().clone();
    let latest = tokio::task::spawn_blocking(move || store.latest()).await??;

    Ok(match latest {
        Some(report) => Json(report).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(MessageResponse::new("No reports found")),
        )
            .into_response(),
    })
}
