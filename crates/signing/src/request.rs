//! Signing request as sent by the browser

use crate::config::PlacementConfig;
use crate::coordinates::PreviewSize;
use crate::Result;
use serde::{Deserialize, Serialize};

fn default_page() -> i64 {
    1
}

fn default_preview_width() -> f64 {
    PlacementConfig::default().default_preview.width
}

fn default_preview_height() -> f64 {
    PlacementConfig::default().default_preview.height
}

/// One requested signature placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignaturePlacement {
    pub signature_id: String,
    /// Preview pixels from the left edge
    #[serde(default)]
    pub x: f64,
    /// Preview pixels from the top edge
    #[serde(default)]
    pub y: f64,
    /// 1-based page; zero or negative means the last page
    #[serde(default = "default_page")]
    pub page: i64,
    /// Optional "left" / "right" override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(default)]
    pub is_end_position: bool,
}

impl SignaturePlacement {
    pub fn new(signature_id: impl Into<String>, x: f64, y: f64, page: i64) -> Self {
        Self {
            signature_id: signature_id.into(),
            x,
            y,
            page,
            align: None,
            is_end_position: false,
        }
    }

    pub fn with_align(mut self, align: impl Into<String>) -> Self {
        self.align = Some(align.into());
        self
    }

    pub fn at_end(mut self) -> Self {
        self.is_end_position = true;
        self
    }

    /// Placed at the end of the page rather than at the preview position
    ///
    /// A page of zero or less only selects the last page; the preview
    /// coordinates still apply.
    pub fn is_end_of_document(&self) -> bool {
        self.is_end_position
    }
}

/// Body of an apply-signature request
///
/// When `signatures` is empty the top-level `signature_id`/`x`/`y`/`page`
/// describe the single placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignRequest {
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub signature_id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_preview_width")]
    pub preview_width: f64,
    #[serde(default = "default_preview_height")]
    pub preview_height: f64,
    #[serde(default)]
    pub signatures: Vec<SignaturePlacement>,
}

impl SignRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Placements in request order
    pub fn placements(&self) -> Vec<SignaturePlacement> {
        if self.signatures.is_empty() {
            vec![SignaturePlacement::new(
                self.signature_id.clone(),
                self.x,
                self.y,
                self.page,
            )]
        } else {
            self.signatures.clone()
        }
    }

    pub fn preview(&self) -> PreviewSize {
        PreviewSize::new(self.preview_width, self.preview_height)
    }
}
