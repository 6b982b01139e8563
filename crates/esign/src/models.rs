//! Records kept by the service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signing::{DocumentFormat, DocumentInfo, PlacedSignature, SkippedPlacement};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Account acting on the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl User {
    pub fn new(id: u64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            full_name: String::new(),
            is_staff: false,
            is_superuser: false,
        }
    }

    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    pub fn superuser(mut self) -> Self {
        self.is_staff = true;
        self.is_superuser = true;
        self
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    /// Full name, or the username when it is blank
    pub fn display_name(&self) -> &str {
        match self.full_name.trim() {
            "" => self.username.as_str(),
            name => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Signed,
}

/// Uploaded original document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: u64,
    pub title: String,
    /// Path relative to the media root, under `documents/`
    pub file_name: String,
    pub format: DocumentFormat,
    pub uploaded_at: DateTime<Utc>,
    pub status: DocumentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureKind {
    Drawn,
    Uploaded,
}

/// Stored signature image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub id: Uuid,
    pub owner_id: u64,
    pub kind: SignatureKind,
    /// Path relative to the media root, under `signatures/`
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

/// Output of one apply-signature call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedDocument {
    pub id: Uuid,
    pub document_id: Uuid,
    pub signature_id: Uuid,
    pub signer_id: u64,
    /// Path relative to the media root, under `signed_documents/`
    pub file_name: String,
    pub signed_at: DateTime<Utc>,
    pub position_x: f64,
    pub position_y: f64,
    pub page: usize,
}

/// Emailed signing request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    pub document_id: Uuid,
    pub sent_by: u64,
    pub recipient_email: String,
    #[serde(default)]
    pub recipient_name: String,
    pub token: Uuid,
    pub sent_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted: bool,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invitation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// File handed back to a client
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Links offered after signing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadOptions {
    pub pdf: String,
    pub docx: String,
}

impl DownloadOptions {
    pub fn for_signed(id: Uuid) -> Self {
        Self {
            pdf: format!("/download/{id}/pdf/"),
            docx: format!("/download/{id}/docx/"),
        }
    }
}

/// Response of apply-signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyResult {
    pub success: bool,
    pub signed_document_id: Uuid,
    pub message: String,
    pub download_options: DownloadOptions,
    pub placed: Vec<PlacedSignature>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skipped: Vec<SkippedPlacement>,
}

/// Everything the signing page shows about a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPreview {
    pub document: Document,
    pub info: DocumentInfo,
    pub texts: BTreeMap<usize, String>,
    /// URL the preview pane loads the original from
    pub file_url: String,
}
