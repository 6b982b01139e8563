//! Page information and text for previews

use crate::{DocumentFormat, Result};
use docx_core::DocxPackage;
use pdf_core::PdfDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary shown next to a document preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub format: DocumentFormat,
    /// Real page count for PDF, estimated for DOCX
    pub num_pages: usize,
    /// First page size in points (PDF only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_height: Option<f64>,
    pub has_images: bool,
    /// Body paragraphs (DOCX only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_paragraphs: Option<usize>,
    /// Body tables (DOCX only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_tables: Option<usize>,
}

/// Read page information from document bytes
pub fn document_info(bytes: &[u8], format: DocumentFormat) -> Result<DocumentInfo> {
    match format {
        DocumentFormat::Pdf => {
            let doc = PdfDocument::open_from_bytes(bytes)?;
            let size = doc.first_page_size();
            Ok(DocumentInfo {
                format,
                num_pages: doc.page_count(),
                page_width: Some(size.width),
                page_height: Some(size.height),
                has_images: doc.has_images(),
                num_paragraphs: None,
                num_tables: None,
            })
        }
        DocumentFormat::Docx => {
            let info = DocxPackage::from_bytes(bytes)?.info()?;
            Ok(DocumentInfo {
                format,
                num_pages: info.num_pages,
                page_width: None,
                page_height: None,
                has_images: info.has_images,
                num_paragraphs: Some(info.num_paragraphs),
                num_tables: Some(info.num_tables),
            })
        }
    }
}

/// Text per page; DOCX pages are estimated from text length
pub fn document_texts(bytes: &[u8], format: DocumentFormat) -> Result<BTreeMap<usize, String>> {
    match format {
        DocumentFormat::Pdf => Ok(PdfDocument::open_from_bytes(bytes)?.extract_page_texts()),
        DocumentFormat::Docx => Ok(DocxPackage::from_bytes(bytes)?.text_pages()?),
    }
}
