//! Error types for shelfscan-id

use crate::models::OcrError;
use crate::services::ExtractError;
use thiserror::Error;

/// Errors surfaced by the library's top-level operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("OCR input error: {0}")]
    Ocr(#[from] OcrError),

    #[error("Spine extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Report serialisation error: {0}")]
    Report(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
