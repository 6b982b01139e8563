//! Preview-to-page coordinate mapping
//!
//! Browser previews report positions in pixels with the origin at the
//! top-left corner of a scaled page image. PDF pages use points with the
//! origin at the bottom-left corner, and each page may have its own size.

use crate::config::PlacementConfig;
use docx_core::Alignment;
use pdf_core::PageSize;
use serde::{Deserialize, Serialize};

/// Rendered size of the preview the user clicked on, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewSize {
    pub width: f64,
    pub height: f64,
}

impl PreviewSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Position in preview pixels, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewPoint {
    pub x: f64,
    pub y: f64,
}

impl PreviewPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Position in PDF points, origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdfPoint {
    pub x: f64,
    pub y: f64,
}

impl PdfPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Resolve a requested page number; zero or negative means the last page
pub fn normalize_page(page: i64, page_count: usize) -> usize {
    if page <= 0 {
        page_count
    } else {
        page as usize
    }
}

/// A blank override counts as no override
fn explicit_align(explicit: Option<&str>) -> Option<&str> {
    explicit.map(str::trim).filter(|value| !value.is_empty())
}

/// Alignment of a PDF signature
///
/// A non-blank `align` wins ("right" in any case means right, any other
/// value left); otherwise the right half of the preview means right.
pub fn infer_alignment(x: f64, preview_width: f64, explicit: Option<&str>) -> Alignment {
    match explicit_align(explicit) {
        Some(value) => Alignment::from_right(value.eq_ignore_ascii_case("right")),
        None => Alignment::from_right(x > preview_width / 2.0),
    }
}

/// Alignment of a DOCX signature, with a fixed pixel threshold
pub fn infer_docx_alignment(x: f64, explicit: Option<&str>, cfg: &PlacementConfig) -> Alignment {
    match explicit_align(explicit) {
        Some(value) => Alignment::from_right(value.eq_ignore_ascii_case("right")),
        None => Alignment::from_right(x > cfg.docx_right_threshold),
    }
}

/// Replace a zero or negative preview size with the fallback size
pub fn effective_preview(preview: PreviewSize, cfg: &PlacementConfig) -> PreviewSize {
    if preview.is_valid() {
        preview
    } else {
        log::warn!(
            "Invalid preview dimensions {}x{}, using {}x{}",
            preview.width,
            preview.height,
            cfg.fallback_preview.width,
            cfg.fallback_preview.height
        );
        cfg.fallback_preview
    }
}

/// Empirical offset applied after scaling, chosen by the horizontal scale
pub fn scale_correction(scale_x: f64) -> (f64, f64) {
    if scale_x > 1.5 {
        (5.0, -5.0)
    } else if scale_x < 0.8 {
        (25.0, -15.0)
    } else {
        (15.0, -10.0)
    }
}

/// Map a preview position to the bottom-left corner of the signature on
/// a PDF page
pub fn map_preview_to_pdf(
    point: PreviewPoint,
    preview: PreviewSize,
    page: PageSize,
    cfg: &PlacementConfig,
) -> PdfPoint {
    let preview = effective_preview(preview, cfg);
    let scale_x = page.width / preview.width;
    let scale_y = page.height / preview.height;

    let x = point.x * scale_x;
    let y = page.height - point.y * scale_y;
    log::debug!(
        "Scale {:.4}x{:.4}: preview ({}, {}) -> flipped ({:.2}, {:.2})",
        scale_x,
        scale_y,
        point.x,
        point.y,
        x,
        y
    );

    let (dx, dy) = scale_correction(scale_x);
    let (x, y) = (x + dx, y + dy);

    // Lower bound applied last so the margin wins on tiny pages
    let max_x = page.width - cfg.signature_width - cfg.margin;
    let max_y = page.height - cfg.signature_height - cfg.margin;
    let clamped = PdfPoint::new(x.min(max_x).max(cfg.margin), y.min(max_y).max(cfg.margin));
    log::debug!(
        "Adjusted ({:.2}, {:.2}) -> clamped ({:.2}, {:.2})",
        x,
        y,
        clamped.x,
        clamped.y
    );
    clamped
}

/// Fixed position near the bottom of the page for end-of-document
/// signatures
pub fn end_of_page_position(alignment: Alignment, page: PageSize, cfg: &PlacementConfig) -> PdfPoint {
    let x = match alignment {
        Alignment::Right => page.width - cfg.end_right_margin,
        Alignment::Left => cfg.end_left_margin,
    };
    PdfPoint::new(x, cfg.end_bottom_margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cfg() -> PlacementConfig {
        PlacementConfig::default()
    }

    #[test]
    fn test_normalize_page() {
        assert_eq!(normalize_page(0, 5), 5);
        assert_eq!(normalize_page(-3, 5), 5);
        assert_eq!(normalize_page(2, 5), 2);
        // Out of range pages pass through for the caller to reject
        assert_eq!(normalize_page(9, 5), 9);
    }

    #[test]
    fn test_infer_alignment_by_half() {
        assert_eq!(infer_alignment(401.0, 800.0, None), Alignment::Right);
        assert_eq!(infer_alignment(400.0, 800.0, None), Alignment::Left);
    }

    #[test]
    fn test_infer_alignment_explicit_wins() {
        assert_eq!(infer_alignment(700.0, 800.0, Some("left")), Alignment::Left);
        assert_eq!(infer_alignment(10.0, 800.0, Some("RIGHT")), Alignment::Right);
        assert_eq!(infer_alignment(700.0, 800.0, Some("center")), Alignment::Left);
    }

    #[test]
    fn test_blank_align_falls_back_to_position() {
        assert_eq!(infer_alignment(700.0, 800.0, Some("")), Alignment::Right);
        assert_eq!(infer_alignment(700.0, 800.0, Some("  ")), Alignment::Right);
        assert_eq!(infer_alignment(100.0, 800.0, Some("")), Alignment::Left);
        assert_eq!(infer_docx_alignment(500.0, Some(""), &cfg()), Alignment::Right);
    }

    #[test]
    fn test_infer_docx_alignment_threshold() {
        assert_eq!(infer_docx_alignment(400.0, None, &cfg()), Alignment::Left);
        assert_eq!(infer_docx_alignment(400.5, None, &cfg()), Alignment::Right);
        assert_eq!(infer_docx_alignment(500.0, Some("Left"), &cfg()), Alignment::Left);
    }

    #[test]
    fn test_effective_preview() {
        let valid = PreviewSize::new(640.0, 480.0);
        assert_eq!(effective_preview(valid, &cfg()), valid);
        assert_eq!(
            effective_preview(PreviewSize::new(0.0, 600.0), &cfg()),
            PreviewSize::new(800.0, 1000.0)
        );
        assert_eq!(
            effective_preview(PreviewSize::new(800.0, -1.0), &cfg()),
            PreviewSize::new(800.0, 1000.0)
        );
    }

    #[test]
    fn test_scale_correction_ranges() {
        assert_eq!(scale_correction(2.0), (5.0, -5.0));
        assert_eq!(scale_correction(1.5), (15.0, -10.0));
        assert_eq!(scale_correction(0.8), (15.0, -10.0));
        assert_eq!(scale_correction(0.5), (25.0, -15.0));
    }

    #[test]
    fn test_map_medium_scale() {
        // Letter page, 612x792 preview: scale 1.0
        let point = map_preview_to_pdf(
            PreviewPoint::new(100.0, 200.0),
            PreviewSize::new(612.0, 792.0),
            PageSize::LETTER,
            &cfg(),
        );
        assert_eq!(point, PdfPoint::new(115.0, 582.0));
    }

    #[test]
    fn test_map_small_scale() {
        // 1224 px preview of a 612 pt page: scale 0.5
        let point = map_preview_to_pdf(
            PreviewPoint::new(400.0, 400.0),
            PreviewSize::new(1224.0, 1584.0),
            PageSize::LETTER,
            &cfg(),
        );
        assert_eq!(point, PdfPoint::new(225.0, 577.0));
    }

    #[test]
    fn test_map_large_scale() {
        // 306 px preview of a 612 pt page: scale 2.0
        let point = map_preview_to_pdf(
            PreviewPoint::new(100.0, 100.0),
            PreviewSize::new(306.0, 396.0),
            PageSize::LETTER,
            &cfg(),
        );
        assert_eq!(point, PdfPoint::new(205.0, 587.0));
    }

    #[test]
    fn test_map_clamps_to_margins() {
        let preview = PreviewSize::new(612.0, 792.0);
        let top_left = map_preview_to_pdf(PreviewPoint::new(0.0, 0.0), preview, PageSize::LETTER, &cfg());
        assert_eq!(top_left, PdfPoint::new(25.0, 717.0));

        let bottom_right =
            map_preview_to_pdf(PreviewPoint::new(612.0, 792.0), preview, PageSize::LETTER, &cfg());
        assert_eq!(bottom_right, PdfPoint::new(437.0, 25.0));
    }

    #[test]
    fn test_map_tiny_page_margin_wins() {
        let page = PageSize::new(100.0, 60.0);
        let point = map_preview_to_pdf(
            PreviewPoint::new(90.0, 10.0),
            PreviewSize::new(100.0, 60.0),
            page,
            &cfg(),
        );
        assert_eq!(point, PdfPoint::new(25.0, 25.0));
    }

    #[test]
    fn test_map_uses_fallback_preview() {
        let point = map_preview_to_pdf(
            PreviewPoint::new(400.0, 500.0),
            PreviewSize::new(0.0, 0.0),
            PageSize::LETTER,
            &cfg(),
        );
        // scale 0.765 (< 0.8): x = 306 + 25, y = 792 - 396 - 15
        assert!((point.x - 331.0).abs() < 1e-9);
        assert!((point.y - 381.0).abs() < 1e-9);
    }

    #[test]
    fn test_end_of_page_position() {
        assert_eq!(
            end_of_page_position(Alignment::Right, PageSize::LETTER, &cfg()),
            PdfPoint::new(412.0, 30.0)
        );
        assert_eq!(
            end_of_page_position(Alignment::Left, PageSize::A4, &cfg()),
            PdfPoint::new(50.0, 30.0)
        );
    }
}
