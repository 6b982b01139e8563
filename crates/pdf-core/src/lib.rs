//! PDF Core - Low-level PDF manipulation for signature overlays
//!
//! This crate provides functionality for:
//! - Opening and saving PDF documents
//! - Reading per-page geometry (MediaBox / CropBox, inherited)
//! - Drawing signature images (JPEG, PNG with transparency) at native coordinates
//! - Drawing short labels in the standard Helvetica font
//! - Extracting page text for previews
//!
//! All coordinates accepted by this crate are native PDF coordinates:
//! points, origin at the bottom-left corner of the page.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::PdfDocument;
//!
//! let mut doc = PdfDocument::open("contract.pdf")?;
//! let size = doc.page_size(1)?;
//! doc.insert_image(&signature_png, 1, 50.0, 30.0, 150.0, 50.0)?;
//! doc.insert_label("Signature", 1, 105.0, 15.0, 10.0)?;
//! doc.save("contract-signed.pdf")?;
//! ```

mod document;
mod image;
mod text;

pub use document::{Color, PdfDocument};
pub use image::{detect_format, get_dimensions, ImageDimensions, ImageFormat, ImageXObject};
pub use text::{escape_pdf_string, generate_label_operators, TextLabel};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// US Letter, used when a page carries no usable box
    pub const LETTER: PageSize = PageSize::new(612.0, 792.0);

    /// ISO A4
    pub const A4: PageSize = PageSize::new(595.28, 841.89);
}

impl Default for PageSize {
    fn default() -> Self {
        Self::LETTER
    }
}

/// Magic header every PDF file starts with
pub const PDF_HEADER: &[u8] = b"%PDF";

/// Check whether `data` starts with the `%PDF` header
pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(PDF_HEADER)
}
