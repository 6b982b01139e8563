//! Signature placement in DOCX documents
//!
//! DOCX has no absolute coordinates. Regular signatures become aligned
//! paragraphs appended to the body; end-of-document signatures go into the
//! default footer of every section.

use crate::config::PlacementConfig;
use crate::coordinates::{infer_docx_alignment, normalize_page};
use crate::outcome::{PlacedSignature, SigningOutcome};
use crate::request::SignaturePlacement;
use crate::{DocumentFormat, Result, SigningError};
use docx_core::{Alignment, DocxPackage, FooterSignature, SignatureImage};
use std::collections::HashMap;

struct Resolved {
    image: SignatureImage,
    alignment: Alignment,
    page: usize,
    end_of_document: bool,
}

/// Place every signature in a DOCX document
///
/// Fails when any placement references a signature without an image.
/// Regular signatures are appended grouped by page, pages in order of first
/// appearance.
pub fn sign_docx(
    docx_bytes: &[u8],
    placements: &[SignaturePlacement],
    images: &HashMap<String, Vec<u8>>,
    cfg: &PlacementConfig,
) -> Result<SigningOutcome> {
    if placements.is_empty() {
        return Err(SigningError::NoSignatures);
    }

    let mut docx = DocxPackage::from_bytes(docx_bytes)?;
    let page_count = docx.info()?.num_pages;

    let mut resolved = Vec::with_capacity(placements.len());
    let mut placed = Vec::with_capacity(placements.len());
    for placement in placements {
        let data = images
            .get(&placement.signature_id)
            .ok_or_else(|| SigningError::MissingSignatureImage(placement.signature_id.clone()))?;
        let image = SignatureImage::from_bytes(data.clone())?;
        let alignment = infer_docx_alignment(placement.x, placement.align.as_deref(), cfg);
        let page = normalize_page(placement.page, page_count);
        let end_of_document = placement.is_end_of_document();

        placed.push(PlacedSignature {
            signature_id: placement.signature_id.clone(),
            page,
            x: placement.x,
            y: placement.y,
            alignment,
            end_of_document,
        });
        resolved.push(Resolved {
            image,
            alignment,
            page,
            end_of_document,
        });
    }

    let footer_signatures: Vec<FooterSignature<'_>> = resolved
        .iter()
        .filter(|r| r.end_of_document)
        .map(|r| FooterSignature {
            image: &r.image,
            alignment: r.alignment,
            width_inches: cfg.docx_width(r.alignment),
        })
        .collect();
    if !footer_signatures.is_empty() {
        log::info!("Placing {} end-position signature(s) in footers", footer_signatures.len());
        docx.replace_footers(&footer_signatures)?;
    }

    let regular: Vec<&Resolved> = resolved.iter().filter(|r| !r.end_of_document).collect();
    let mut pages: Vec<usize> = Vec::new();
    for r in &regular {
        if !pages.contains(&r.page) {
            pages.push(r.page);
        }
    }
    for page in pages {
        for r in regular.iter().filter(|r| r.page == page) {
            log::debug!("Appending {} aligned signature for page {}", r.alignment, page);
            docx.append_signature(
                &r.image,
                r.alignment,
                cfg.docx_width(r.alignment),
                cfg.docx_spacing_paragraphs,
            )?;
        }
    }

    let bytes = docx.to_bytes()?;
    log::info!("Signed DOCX with {} signature(s)", placed.len());
    Ok(SigningOutcome {
        bytes,
        format: DocumentFormat::Docx,
        placed,
        skipped: Vec::new(),
    })
}

/// Put the same signature in the footer of every section so it shows on
/// every page, keeping existing footer content
pub fn sign_docx_all_footers(
    docx_bytes: &[u8],
    image: &[u8],
    cfg: &PlacementConfig,
) -> Result<Vec<u8>> {
    let mut docx = DocxPackage::from_bytes(docx_bytes)?;
    let image = SignatureImage::from_bytes(image.to_vec())?;
    docx.append_footer_image(&image, cfg.footer_width_inches)?;
    log::info!("Placed signature in all footers");
    Ok(docx.to_bytes()?)
}
