//! Text extraction: turns an uploaded PDF/DOCX into normalized plain text.
//!
//! Raw extraction runs on the blocking pool: `pdf-extract` is CPU bound and is known to panic on
//! some malformed documents, and a panic inside `spawn_blocking` surfaces as a `JoinError` we can
//! report as `ExtractionFailed` instead of taking the request task down.

pub mod chunker;
pub mod normalize;

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use chunker::split_text;
pub use normalize::normalize_text;

/// The closed set of document formats the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Resolves the format from the extension after the last `.` (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let (_, ext) = filename
            .rsplit_once('.')
            .ok_or_else(|| ExtractError::UnsupportedFormat(format!("'{filename}' has no extension")))?;

        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            other => Err(ExtractError::UnsupportedFormat(format!(
                "unsupported file type: {}",
                other.to_ascii_uppercase()
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to extract text from {format} document: {reason}")]
    ExtractionFailed {
        format: DocumentFormat,
        reason: String,
    },
}

/// Extracts raw text from `content` and normalizes it.
///
/// A blank result is returned as an empty string; callers decide whether that is fatal.
pub async fn extract_text(content: Bytes, format: DocumentFormat) -> Result<String, ExtractError> {
    let raw = tokio::task::spawn_blocking(move || match format {
        DocumentFormat::Pdf => extract_pdf(&content),
        DocumentFormat::Docx => extract_docx(&content),
    })
    .await
    .map_err(|e| ExtractError::ExtractionFailed {
        format,
        reason: format!("extraction task aborted: {e}"),
    })??;

    Ok(normalize_text(&raw))
}

fn extract_pdf(content: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(content).map_err(|e| ExtractError::ExtractionFailed {
        format: DocumentFormat::Pdf,
        reason: e.to_string(),
    })
}

fn extract_docx(content: &[u8]) -> Result<String, ExtractError> {
    let doc = docx_rs::read_docx(content).map_err(|e| ExtractError::ExtractionFailed {
        format: DocumentFormat::Docx,
        reason: e.to_string(),
    })?;

    let mut text = String::new();
    for child in doc.document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = child {
            for child in p.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        match child {
                            docx_rs::RunChild::Text(t) => text.push_str(&t.text),
                            docx_rs::RunChild::Tab(_) => text.push(' '),
                            _ => {}
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}
