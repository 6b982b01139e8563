//! DOCX Core - Package-level DOCX editing for signature placement
//!
//! A DOCX file is a zip of XML parts. This crate edits those parts
//! directly and never computes layout:
//! - Reading basic document statistics and an estimated page split
//! - Appending aligned signature paragraphs at the end of the body
//! - Placing signatures in the default footer of every section
//!
//! # Example
//!
//! ```ignore
//! use docx_core::{Alignment, DocxPackage, SignatureImage};
//!
//! let mut docx = DocxPackage::open("contract.docx")?;
//! let image = SignatureImage::from_bytes(signature_png)?;
//! docx.append_signature(&image, Alignment::Right, 1.8, 3)?;
//! docx.save("contract-signed.docx")?;
//! ```

mod content_types;
mod info;
mod package;
mod relationships;
mod signature;
mod xml;

pub use info::DocxInfo;
pub use package::DocxPackage;
pub use relationships::{Relationship, Relationships};
pub use signature::{FooterSignature, SignatureImage, SIGNATURE_LABEL};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during DOCX operations
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("Failed to open DOCX: {0}")]
    OpenError(String),

    #[error("Missing package part: {0}")]
    MissingPart(String),

    #[error("XML error in {part}: {message}")]
    XmlError { part: String, message: String },

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for DOCX operations
pub type Result<T> = std::result::Result<T, DocxError>;

/// EMUs (English Metric Units) per inch
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Main document part
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Package content types part
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Horizontal alignment of a signature paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

impl Alignment {
    pub fn from_right(is_right: bool) -> Self {
        if is_right {
            Alignment::Right
        } else {
            Alignment::Left
        }
    }

    pub fn is_right(self) -> bool {
        self == Alignment::Right
    }

    /// Value of the `w:jc` paragraph property
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Right => "right",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether `data` looks like a zip container
pub fn is_zip(data: &[u8]) -> bool {
    data.starts_with(b"PK\x03\x04")
}
