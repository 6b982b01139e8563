//! Result of a signing pass

use crate::DocumentFormat;
use docx_core::Alignment;
use serde::{Deserialize, Serialize};

/// Coordinates actually used for one signature
///
/// For PDF these are page points (bottom-left origin); for DOCX they are
/// the preview pixels the user picked, since flow layout has no position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedSignature {
    pub signature_id: String,
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub alignment: Alignment,
    pub end_of_document: bool,
}

/// A requested placement that was not applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPlacement {
    /// Position in the request
    pub index: usize,
    pub signature_id: String,
    pub reason: String,
}

/// Signed document plus what was placed
#[derive(Debug, Clone)]
pub struct SigningOutcome {
    pub bytes: Vec<u8>,
    pub format: DocumentFormat,
    pub placed: Vec<PlacedSignature>,
    pub skipped: Vec<SkippedPlacement>,
}

impl SigningOutcome {
    /// First placed signature, used as the stored position
    pub fn primary(&self) -> Option<&PlacedSignature> {
        self.placed.first()
    }
}
