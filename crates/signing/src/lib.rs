//! Signing - Place signature images on PDF and DOCX documents
//!
//! This crate provides:
//! - Mapping of browser-preview pixel positions to PDF page coordinates
//! - End-of-document placement and left/right alignment inference
//! - Batch placement of several signatures in one pass
//! - DOCX placement at the end of the body or in section footers
//! - Rule-based suggestions for where a signature belongs
//!
//! # Example
//!
//! ```ignore
//! use signing::{sign_pdf, PlacementConfig, SignRequest};
//!
//! let request = SignRequest::from_json(request_json)?;
//! let outcome = sign_pdf(
//!     &pdf_bytes,
//!     &request.placements(),
//!     &images,
//!     request.preview(),
//!     &PlacementConfig::default(),
//! )?;
//! std::fs::write("signed.pdf", &outcome.bytes)?;
//! ```

mod config;
mod coordinates;
mod docx;
mod info;
mod outcome;
mod pdf;
mod request;
mod suggest;

pub use config::PlacementConfig;
pub use coordinates::{
    effective_preview, end_of_page_position, infer_alignment, infer_docx_alignment,
    map_preview_to_pdf, normalize_page, scale_correction, PdfPoint, PreviewPoint, PreviewSize,
};
pub use docx::{sign_docx, sign_docx_all_footers};
pub use info::{document_info, document_texts, DocumentInfo};
pub use outcome::{PlacedSignature, SigningOutcome, SkippedPlacement};
pub use pdf::sign_pdf;
pub use request::{SignRequest, SignaturePlacement};
pub use suggest::{
    analyze_for_signature, extract_key_information, suggest_positions, Confidence,
    KeyInformation, SignatureAnalysis, SignatureSuggestion, SuggestedPosition,
};

pub use docx_core::Alignment;
pub use pdf_core::PageSize;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while signing documents
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("No signatures provided")]
    NoSignatures,

    #[error("Signature image not found for signature {0}")]
    MissingSignatureImage(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("DOCX error: {0}")]
    DocxError(#[from] docx_core::DocxError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for signing operations
pub type Result<T> = std::result::Result<T, SigningError>;

/// Document formats that can be signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Detect the format from a file extension, ignoring case
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            other => Err(SigningError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Detect the format from the extension of a file name or path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| SigningError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }

    pub fn content_type(self) -> &'static str {
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
        f.write_str(self.extension())
    }
}
