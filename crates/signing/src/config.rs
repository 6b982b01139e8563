//! Placement constants

use crate::coordinates::PreviewSize;
use serde::{Deserialize, Serialize};

/// Tunable constants used when placing signatures
///
/// The defaults reproduce the layout users expect; every field can be
/// overridden from JSON, missing fields keep their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Drawn signature width in points
    pub signature_width: f64,
    /// Drawn signature height in points
    pub signature_height: f64,
    /// Minimum distance between a signature and the page edge
    pub margin: f64,

    /// End-of-document placement: distance from the left edge
    pub end_left_margin: f64,
    /// End-of-document placement: right-aligned `x` is `page width - this`
    pub end_right_margin: f64,
    /// End-of-document placement: distance from the bottom edge
    pub end_bottom_margin: f64,

    pub label_text: String,
    pub label_font_size: f64,
    /// Label `x` relative to the horizontal center of the signature
    pub label_offset_x: f64,
    /// Label baseline relative to the bottom of the signature
    pub label_offset_y: f64,

    /// Preview size assumed when the request does not send one
    pub default_preview: PreviewSize,
    /// Preview size used when the request sends a non-positive one
    pub fallback_preview: PreviewSize,

    /// DOCX: preview `x` beyond this many pixels means right aligned
    pub docx_right_threshold: f64,
    pub docx_width_inches: f64,
    pub docx_right_width_inches: f64,
    pub footer_width_inches: f64,
    /// DOCX: blank paragraphs inserted before each appended signature
    pub docx_spacing_paragraphs: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            signature_width: 150.0,
            signature_height: 50.0,
            margin: 25.0,
            end_left_margin: 50.0,
            end_right_margin: 200.0,
            end_bottom_margin: 30.0,
            label_text: "Signature".to_string(),
            label_font_size: 10.0,
            label_offset_x: -20.0,
            label_offset_y: -15.0,
            default_preview: PreviewSize::new(800.0, 600.0),
            fallback_preview: PreviewSize::new(800.0, 1000.0),
            docx_right_threshold: 400.0,
            docx_width_inches: 2.0,
            docx_right_width_inches: 1.8,
            footer_width_inches: 1.5,
            docx_spacing_paragraphs: 3,
        }
    }
}

impl PlacementConfig {
    /// Parse a config from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Label anchor for a signature drawn at `x`/`y`
    pub fn label_position(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x + self.signature_width / 2.0 + self.label_offset_x,
            y + self.label_offset_y,
        )
    }

    /// DOCX picture width for an alignment
    pub fn docx_width(&self, alignment: docx_core::Alignment) -> f64 {
        if alignment.is_right() {
            self.docx_right_width_inches
        } else {
            self.docx_width_inches
        }
    }
}
