//! Report upload endpoint

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::path::Path;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{MessageResponse, UploadResponse};

/// Multipart field carrying the report
const FILE_FIELD: &str = "file";

/// Body of the 400 returned when a file yields no text
pub const EXTRACTION_FAILED: &str = "Failed to extract content from file.";

/// POST /upload/ - Store, extract, persist and index a report
pub async fn upload_report(State(state): State<AppState>, mut multipart: Multipart) -> Result<Response> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Upload(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .and_then(base_name)
            .ok_or_else(|| Error::Upload("Uploaded file has no usable filename".to_string()))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::Upload(format!("Failed to read file: {}", e)))?;

        upload = Some((filename, data));
        break;
    }

    let (filename, data) = upload.ok_or_else(|| {
        tracing::warn!("Upload request without a '{}' field", FILE_FIELD);
        Error::Upload(format!("Missing '{}' field", FILE_FIELD))
    })?;

    // Same name overwrites the previous upload
    let path = state.config().storage.data_dir.join(&filename);
    tokio::fs::write(&path, &data).await.map_err(|e| {
        tracing::error!("Failed to save {}: {}", path.display(), e);
        e
    })?;
    tracing::info!("Saved upload {} ({} bytes)", path.display(), data.len());

    let extractor = state.extractor().clone();
    let extract_path = path.clone();
    let content = tokio::task::spawn_blocking(move || extractor.extract(&extract_path))
        .await?
        .map_err(|e| {
            tracing::error!("Extraction failed for {}: {}", filename, e);
            e
        })?;

    let content = match content {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            tracing::warn!("No content extracted from {}", filename);
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(MessageResponse::new(EXTRACTION_FAILED)),
            )
                .into_response());
        }
    };

    let store = state.store().clone();
    let report_filename = filename.clone();
    let report = tokio::task::spawn_blocking(move || store.save(&report_filename, &content))
        .await?
        .map_err(|e| {
            tracing::error!("Failed to persist report for {}: {}", filename, e);
            e
        })?;

    let added = state.index().add(&path).await.map_err(|e| {
        tracing::error!("Failed to index {}: {}", filename, e);
        e
    })?;

    tracing::info!(
        "Processed {}: report {} saved, {} chunks indexed",
        filename,
        report.id,
        added
    );

    Ok(Json(UploadResponse::processed(filename)).into_response())
}

/// Final path component of a client-supplied filename
fn base_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
}
