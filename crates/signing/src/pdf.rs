//! Batch signature placement on PDF pages

use crate::config::PlacementConfig;
use crate::coordinates::{
    effective_preview, end_of_page_position, infer_alignment, map_preview_to_pdf, normalize_page,
    PreviewPoint, PreviewSize,
};
use crate::outcome::{PlacedSignature, SigningOutcome, SkippedPlacement};
use crate::request::SignaturePlacement;
use crate::{DocumentFormat, Result, SigningError};
use pdf_core::PdfDocument;
use std::collections::HashMap;

/// Draw every placement onto the PDF in one pass
///
/// `images` maps signature ids to PNG or JPEG bytes. Each placement is
/// mapped with the size of its own page. Placements on pages that do not
/// exist, or whose image is missing, are skipped and reported in
/// [`SigningOutcome::skipped`].
pub fn sign_pdf(
    pdf_bytes: &[u8],
    placements: &[SignaturePlacement],
    images: &HashMap<String, Vec<u8>>,
    preview: PreviewSize,
    cfg: &PlacementConfig,
) -> Result<SigningOutcome> {
    if placements.is_empty() {
        return Err(SigningError::NoSignatures);
    }

    let mut doc = PdfDocument::open_from_bytes(pdf_bytes)?;
    let page_count = doc.page_count();
    let preview = effective_preview(preview, cfg);
    log::info!(
        "Placing {} signature(s) on a {}-page PDF (preview {}x{})",
        placements.len(),
        page_count,
        preview.width,
        preview.height
    );

    let mut placed = Vec::new();
    let mut skipped = Vec::new();

    for (index, placement) in placements.iter().enumerate() {
        let page = normalize_page(placement.page, page_count);
        if page == 0 || page > page_count {
            log::warn!(
                "Skipping signature {}: page {} does not exist ({} pages)",
                placement.signature_id,
                placement.page,
                page_count
            );
            skipped.push(SkippedPlacement {
                index,
                signature_id: placement.signature_id.clone(),
                reason: format!("Page {} does not exist in the document", placement.page),
            });
            continue;
        }

        let Some(image) = images.get(&placement.signature_id) else {
            log::warn!("Skipping signature {}: no image", placement.signature_id);
            skipped.push(SkippedPlacement {
                index,
                signature_id: placement.signature_id.clone(),
                reason: "Signature image not found".to_string(),
            });
            continue;
        };

        let page_size = doc.page_size(page)?;
        let alignment = infer_alignment(placement.x, preview.width, placement.align.as_deref());
        let end_of_document = placement.is_end_of_document();

        let point = if end_of_document {
            let point = end_of_page_position(alignment, page_size, cfg);
            log::debug!(
                "End position on page {}: {} aligned at ({}, {})",
                page,
                alignment,
                point.x,
                point.y
            );
            point
        } else {
            map_preview_to_pdf(
                PreviewPoint::new(placement.x, placement.y),
                preview,
                page_size,
                cfg,
            )
        };

        doc.insert_image(
            image,
            page,
            point.x,
            point.y,
            cfg.signature_width,
            cfg.signature_height,
        )?;
        let (label_x, label_y) = cfg.label_position(point.x, point.y);
        doc.insert_label(&cfg.label_text, page, label_x, label_y, cfg.label_font_size)?;

        placed.push(PlacedSignature {
            signature_id: placement.signature_id.clone(),
            page,
            x: point.x,
            y: point.y,
            alignment,
            end_of_document,
        });
    }

    let bytes = doc.to_bytes()?;
    log::info!(
        "Signed PDF: {} placed, {} skipped",
        placed.len(),
        skipped.len()
    );

    Ok(SigningOutcome {
        bytes,
        format: DocumentFormat::Pdf,
        placed,
        skipped,
    })
}
