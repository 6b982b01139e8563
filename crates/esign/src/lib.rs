//! Esign - Document e-signature service
//!
//! This crate provides the workflow around signature placement:
//! - Uploading PDF and DOCX documents and storing them under a media root
//! - Creating drawn (base64) or uploaded signature images
//! - Applying one or many signatures and recording the signed output
//! - Downloading signed documents and serving originals for preview
//! - Emailing signing invitations with expiring token links
//! - Notifying administrators of user activity
//!
//! Persistence and mail delivery sit behind the [`Store`] and [`Mailer`]
//! traits. The service is synchronous: one call does one unit of work.
//!
//! # Example
//!
//! ```ignore
//! use esign::{EsignConfig, EsignService, LogMailer, MemoryStore};
//!
//! let config = EsignConfig::from_json_file("esign.json")?;
//! let mut service = EsignService::new(config, MemoryStore::new(), LogMailer)?;
//! let document = service.upload_document(&user, "Lease", "lease.pdf", &bytes)?;
//! let result = service.apply_signature(&user, &request)?;
//! let download = service.download_signed(result.signed_document_id)?;
//! ```

mod config;
mod invitation;
mod mail;
mod media;
mod models;
mod notify;
mod service;
mod store;

pub use config::EsignConfig;
pub use invitation::{render_invitation, sign_path, InvitationContext, InvitationEmail};
pub use mail::{EmailMessage, LogMailer, Mailer};
pub use media::{MediaKind, MediaStore};
pub use models::{
    ApplyResult, DocumentPreview, Document, DocumentStatus, Download, DownloadOptions,
    Invitation, Signature, SignatureKind, SignedDocument, User,
};
pub use notify::{activity_message, admin_recipients, ActivityKind};
pub use service::EsignService;
pub use store::{MemoryStore, Store};

pub use signing::{DocumentFormat, PlacementConfig, SignRequest, SignaturePlacement};

use thiserror::Error;

/// Errors that can occur in the service layer
#[derive(Debug, Error)]
pub enum EsignError {
    #[error("{0}")]
    Validation(String),

    #[error("Access denied: {0}")]
    PermissionDenied(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("This invitation has expired")]
    InvitationExpired,

    #[error("This invitation has already been used")]
    InvitationUsed,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Signing(#[from] signing::SigningError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EsignError {
    /// HTTP status code an API layer should answer with
    pub fn status_code(&self) -> u16 {
        use signing::SigningError;
        match self {
            EsignError::Validation(_) => 400,
            EsignError::PermissionDenied(_) => 403,
            EsignError::NotFound(_) => 404,
            EsignError::InvitationExpired | EsignError::InvitationUsed => 410,
            EsignError::Signing(
                SigningError::UnsupportedFormat(_)
                | SigningError::NoSignatures
                | SigningError::MissingSignatureImage(_)
                | SigningError::InvalidRequest(_),
            ) => 400,
            _ => 500,
        }
    }

    /// Error body in the `{"success": false, "error": ...}` shape
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "error": self.to_string(),
        })
    }
}

/// Result type for service operations
pub type Result<T> = std::result::Result<T, EsignError>;
