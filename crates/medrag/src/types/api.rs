//! Request and response bodies of the HTTP API

use serde::{Deserialize, Serialize};

/// Body of `POST /chat/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Free-text question
    pub query: String,
}

/// Response of `POST /chat/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated answer, verbatim from the model
    pub response: String,
}

/// Response of a successful `POST /upload/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
}

impl UploadResponse {
    pub fn processed(filename: impl Into<String>) -> Self {
        Self {
            message: "File uploaded and processed successfully!".to_string(),
            filename: filename.into(),
        }
    }
}

/// Plain `{message}` body used for client-facing failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
