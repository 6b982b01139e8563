//! Document statistics and estimated page split

use crate::package::DocxPackage;
use crate::xml::{find_elements, paragraph_text};
use crate::{Result, DOCUMENT_PART};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Characters assumed to fit on one page when estimating pagination
pub const CHARS_PER_PAGE: usize = 1000;

/// Basic information about a DOCX document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocxInfo {
    pub num_paragraphs: usize,
    pub num_tables: usize,
    /// Estimated from text length, DOCX has no fixed pages
    pub num_pages: usize,
    pub has_images: bool,
}

impl DocxPackage {
    /// Texts of body-level paragraphs, including empty ones
    fn body_paragraph_texts(&self) -> Result<Vec<String>> {
        let xml = self.part_str(DOCUMENT_PART)?;
        Ok(find_elements(DOCUMENT_PART, &xml, "p", Some("body"))?
            .iter()
            .map(|span| paragraph_text(span.outer(&xml)))
            .collect())
    }

    /// Collect statistics about the document body
    pub fn info(&self) -> Result<DocxInfo> {
        let xml = self.part_str(DOCUMENT_PART)?;
        let paragraphs = self.body_paragraph_texts()?;
        let num_tables = find_elements(DOCUMENT_PART, &xml, "tbl", Some("body"))?.len();
        let has_images = self.relationships(DOCUMENT_PART)?.has_images();

        let info = DocxInfo {
            num_paragraphs: paragraphs.len(),
            num_tables,
            num_pages: estimate_page_count(&paragraphs),
            has_images,
        };
        log::debug!("DOCX info: {:?}", info);
        Ok(info)
    }

    /// Paragraph text grouped into estimated pages, joined by newlines
    pub fn text_pages(&self) -> Result<BTreeMap<usize, String>> {
        let paragraphs = self.body_paragraph_texts()?;
        Ok(paginate(&paragraphs)
            .into_iter()
            .enumerate()
            .map(|(i, page)| (i + 1, page.join("\n")))
            .collect())
    }
}

/// Estimated page count, at least 1
///
/// Any paragraph that overflows the running count opens a new page, even
/// when the current page is still empty.
fn estimate_page_count(paragraphs: &[String]) -> usize {
    let mut pages = 1;
    let mut count = 0;
    for text in paragraphs.iter().filter(|p| !p.trim().is_empty()) {
        let len = text.chars().count();
        if count + len > CHARS_PER_PAGE {
            pages += 1;
            count = len;
        } else {
            count += len;
        }
    }
    pages
}

/// Split non-blank paragraphs into pages of roughly [`CHARS_PER_PAGE`]
///
/// A paragraph that would overflow the current page starts a new one; a
/// single paragraph longer than the limit still gets a page to itself.
fn paginate(paragraphs: &[String]) -> Vec<Vec<&str>> {
    let mut pages: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut count = 0;

    for text in paragraphs.iter().filter(|p| !p.trim().is_empty()) {
        let len = text.chars().count();
        if count + len > CHARS_PER_PAGE && !current.is_empty() {
            pages.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(text);
        count += len;
    }
    if !current.is_empty() {
        pages.push(current);
    }
    pages
}
