//! PDF text extraction and image OCR

use std::io::Read;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};
use crate::types::FileKind;

/// Text of a single page (1-indexed)
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// Leading bytes of the raster formats accepted for OCR
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = b"\xFF\xD8\xFF";

/// Extracts plain text from PDFs and images
#[derive(Debug, Clone)]
pub struct TextExtractor {
    /// OCR executable
    ocr_command: String,
    /// Language passed to tesseract
    ocr_language: String,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor {
    /// Create an extractor using English OCR
    pub fn new() -> Self {
        Self {
            ocr_command: "tesseract".to_string(),
            ocr_language: "eng".to_string(),
        }
    }

    /// Use a different OCR executable (a tesseract-compatible CLI)
    pub fn with_ocr_command(mut self, command: impl Into<String>) -> Self {
        self.ocr_command = command.into();
        self
    }

    /// Extract the text of a file, choosing the strategy by extension.
    ///
    /// Returns `Ok(None)` for unsupported file types. PDF pages are joined
    /// with single spaces; OCR output is trimmed.
    pub fn extract(&self, path: &Path) -> Result<Option<String>> {
        tracing::info!("Extracting text from: {}", path.display());

        match FileKind::from_path(path) {
            FileKind::Pdf => {
                let pages = self.pdf_pages(path)?;
                let text = pages
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                Ok(Some(text))
            }
            FileKind::Image => Ok(Some(self.ocr_image(path)?)),
            FileKind::Unsupported => {
                tracing::warn!("Unsupported file type: {}", path.display());
                Ok(None)
            }
        }
    }

    /// Load a file as per-page text for indexing
    pub fn load_pages(&self, path: &Path) -> Result<Vec<PageText>> {
        match FileKind::from_path(path) {
            FileKind::Pdf => self.pdf_pages(path),
            FileKind::Image => Ok(vec![PageText {
                page_number: 1,
                text: self.ocr_image(path)?,
            }]),
            FileKind::Unsupported => Err(Error::UnsupportedFileType(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("none")
                    .to_string(),
            )),
        }
    }

    /// Extract PDF text page by page with lopdf, falling back to pdf-extract
    fn pdf_pages(&self, path: &Path) -> Result<Vec<PageText>> {
        let filename = display_name(path);

        let pages = match lopdf::Document::load(path) {
            Ok(doc) => doc
                .get_pages()
                .keys()
                .map(|&page_number| {
                    let text = doc.extract_text(&[page_number]).unwrap_or_else(|e| {
                        tracing::warn!("No text layer on page {} of {}: {}", page_number, filename, e);
                        String::new()
                    });
                    PageText {
                        page_number,
                        text: text.trim().to_string(),
                    }
                })
                .collect::<Vec<_>>(),
            Err(e) => {
                tracing::warn!("lopdf could not load {}: {}", filename, e);
                Vec::new()
            }
        };

        if pages.iter().any(|p| !p.text.is_empty()) {
            let pages: Vec<PageText> = pages.into_iter().filter(|p| !p.text.is_empty()).collect();
            tracing::info!("Extracted {} pages of text from {}", pages.len(), filename);
            return Ok(pages);
        }

        // Whole-document fallback for fonts lopdf cannot decode.
        // pdf-extract panics on some malformed documents (e.g. undefined fonts)
        let text = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text(path)))
            .map_err(|payload| {
                let reason = panic_message(payload.as_ref());
                tracing::warn!("pdf-extract crashed on {}: {}", filename, reason);
                Error::extraction(filename.clone(), format!("Malformed PDF: {}", reason))
            })?
            .map_err(|e| Error::extraction(filename.clone(), e.to_string()))?;

        Ok(vec![PageText {
            page_number: 1,
            text: text.trim().to_string(),
        }])
    }

    /// Run tesseract over an image and return the trimmed text
    fn ocr_image(&self, path: &Path) -> Result<String> {
        let filename = display_name(path);

        let mut header = [0u8; 8];
        let read = std::fs::File::open(path)?.read(&mut header)?;
        if !is_image_signature(&header[..read]) {
            return Err(Error::extraction(filename, "Not a valid PNG or JPEG image"));
        }

        let output = Command::new(&self.ocr_command)
            .arg(path)
            .args(["stdout", "-l", self.ocr_language.as_str()])
            .output()
            .map_err(|e| {
                tracing::error!("Could not run {}: {}", self.ocr_command, e);
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::Config(format!(
                        "Image OCR requires {} (apt install tesseract-ocr)",
                        self.ocr_command
                    ))
                } else {
                    Error::internal(format!("Failed to run {}: {}", self.ocr_command, e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::extraction(filename, format!("tesseract error: {}", stderr.trim())));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::info!("Image OCR extracted {} characters from {}", text.len(), filename);
        Ok(text)
    }
}

fn is_image_signature(header: &[u8]) -> bool {
    header.starts_with(PNG_SIGNATURE) || header.starts_with(JPEG_SIGNATURE)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
