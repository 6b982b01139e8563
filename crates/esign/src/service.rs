//! Document signing workflow

use crate::config::EsignConfig;
use crate::invitation::{render_invitation, sign_path, InvitationContext};
use crate::mail::{EmailMessage, Mailer};
use crate::media::{file_name, MediaKind, MediaStore};
use crate::models::{
    ApplyResult, Document, DocumentPreview, DocumentStatus, Download, DownloadOptions,
    Invitation, Signature, SignatureKind, SignedDocument, User,
};
use crate::notify::{activity_message, admin_recipients, ActivityKind};
use crate::store::Store;
use crate::{EsignError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Duration, Utc};
use signing::{
    document_info, document_texts, sign_docx, sign_pdf, DocumentFormat, PlacementConfig,
    SignRequest,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

const OCTET_STREAM: &str = "application/octet-stream";

/// Content type for a stored file, by extension
fn content_type_for(name: &str) -> &'static str {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|e| DocumentFormat::from_extension(e).ok())
        .map(DocumentFormat::content_type)
        .unwrap_or(OCTET_STREAM)
}

fn parse_id(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| EsignError::NotFound(format!("{what} {value}")))
}

/// Signing service over a record store, a mailer and a media directory
pub struct EsignService<S: Store, M: Mailer> {
    config: EsignConfig,
    placement: PlacementConfig,
    store: S,
    mailer: M,
    media: MediaStore,
}

impl<S: Store, M: Mailer> EsignService<S, M> {
    /// Create the service, preparing the media directories
    pub fn new(config: EsignConfig, store: S, mailer: M) -> Result<Self> {
        let media = MediaStore::open(&config.media_root)?;
        Ok(Self {
            config,
            placement: PlacementConfig::default(),
            store,
            mailer,
            media,
        })
    }

    /// Use different placement constants
    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self
    }

    pub fn config(&self) -> &EsignConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    fn document(&self, id: Uuid) -> Result<Document> {
        self.store
            .document(id)?
            .ok_or_else(|| EsignError::NotFound("Document".to_string()))
    }

    fn signature(&self, id: Uuid) -> Result<Signature> {
        self.store
            .signature(id)?
            .ok_or_else(|| EsignError::NotFound("Signature".to_string()))
    }

    // ---- Documents ----

    /// Store an uploaded PDF or DOCX and record it as pending
    pub fn upload_document(
        &mut self,
        user: &User,
        title: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Document> {
        let format = DocumentFormat::from_path(file_name).map_err(|_| {
            EsignError::Validation("Only DOCX and PDF files are allowed".to_string())
        })?;
        if bytes.is_empty() {
            return Err(EsignError::Validation("Uploaded file is empty".to_string()));
        }
        if bytes.len() > self.config.max_upload_bytes {
            return Err(EsignError::Validation(format!(
                "File too large: {} bytes (maximum {})",
                bytes.len(),
                self.config.max_upload_bytes
            )));
        }

        let title = match title.trim() {
            "" => file_name.trim(),
            title => title,
        };
        let stored = self.media.store(MediaKind::Documents, file_name, bytes)?;
        let document = Document {
            id: Uuid::new_v4(),
            owner_id: user.id,
            title: title.to_string(),
            file_name: stored,
            format,
            uploaded_at: Utc::now(),
            status: DocumentStatus::Pending,
        };
        self.store.save_document(document.clone())?;
        log::info!(
            "User {} uploaded {} document {} as {}",
            user.username,
            format,
            document.id,
            document.file_name
        );

        self.notify_admins(ActivityKind::DocumentUploaded, user, &document.title);
        Ok(document)
    }

    /// Page info and text for the signing page
    pub fn document_preview(&self, document_id: Uuid) -> Result<DocumentPreview> {
        let document = self.document(document_id)?;
        let bytes = self.media.read(&document.file_name)?;
        let info = document_info(&bytes, document.format)?;
        let texts = match document_texts(&bytes, document.format) {
            Ok(texts) => texts,
            Err(e) => {
                log::warn!("Text extraction failed for {}: {}", document.id, e);
                BTreeMap::from([(1, format!("Error extracting document content: {e}"))])
            }
        };
        Ok(DocumentPreview {
            file_url: format!("/document/{}/preview/", document.id),
            document,
            info,
            texts,
        })
    }

    /// Original bytes for inline display
    pub fn serve_document(&self, document_id: Uuid) -> Result<Download> {
        let document = self.document(document_id)?;
        let bytes = self.media.read(&document.file_name)?;
        Ok(Download {
            file_name: file_name(&document.file_name).to_string(),
            content_type: content_type_for(&document.file_name).to_string(),
            bytes,
        })
    }

    /// Delete a document with its file, signed outputs and invitations
    pub fn delete_document(&mut self, user: &User, document_id: Uuid) -> Result<()> {
        let document = self.document(document_id)?;

        for signed in self.store.signed_documents()? {
            if signed.document_id == document.id {
                self.remove_signed(&signed)?;
            }
        }
        for invitation in self.store.invitations_for(document.id)? {
            self.store.remove_invitation(invitation.id)?;
        }
        self.store.remove_document(document.id)?;
        if !self.media.delete(&document.file_name)? {
            log::warn!("Document file already missing: {}", document.file_name);
        }
        log::info!("User {} deleted document {}", user.username, document.id);

        self.notify_admins(ActivityKind::DocumentDeleted, user, &document.title);
        Ok(())
    }

    fn remove_signed(&mut self, signed: &SignedDocument) -> Result<()> {
        self.store.remove_signed_document(signed.id)?;
        self.media.delete(&signed.file_name)?;
        Ok(())
    }

    // ---- Signatures ----

    /// Store a drawn signature sent as base64, optionally as a data URL
    pub fn create_drawn_signature(&mut self, user: &User, data: &str) -> Result<Signature> {
        let data = data.trim();
        if data.is_empty() {
            return Err(EsignError::Validation("No signature data provided".to_string()));
        }
        let encoded = match data.find("base64,") {
            Some(i) => &data[i + "base64,".len()..],
            None => data,
        };
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| EsignError::Validation(format!("Error processing signature: {e}")))?;
        pdf_core::get_dimensions(&bytes)
            .map_err(|e| EsignError::Validation(format!("Error processing signature: {e}")))?;

        let id = Uuid::new_v4();
        let stored = self
            .media
            .write(MediaKind::Signatures, &format!("signature_{id}.png"), &bytes)?;
        self.save_signature(user, id, SignatureKind::Drawn, stored)
    }

    /// Store an uploaded signature image
    pub fn create_uploaded_signature(
        &mut self,
        user: &User,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<Signature> {
        if !content_type.trim().to_ascii_lowercase().starts_with("image/") {
            return Err(EsignError::Validation("Only image files are allowed".to_string()));
        }
        pdf_core::get_dimensions(bytes)
            .map_err(|e| EsignError::Validation(format!("Error processing signature: {e}")))?;

        let stored = self.media.store(MediaKind::Signatures, file_name, bytes)?;
        self.save_signature(user, Uuid::new_v4(), SignatureKind::Uploaded, stored)
    }

    fn save_signature(
        &mut self,
        user: &User,
        id: Uuid,
        kind: SignatureKind,
        file_name: String,
    ) -> Result<Signature> {
        let signature = Signature {
            id,
            owner_id: user.id,
            kind,
            file_name,
            created_at: Utc::now(),
        };
        self.store.save_signature(signature.clone())?;
        log::info!("User {} created {:?} signature {}", user.username, kind, id);

        self.notify_admins(ActivityKind::SignatureCreated, user, "");
        Ok(signature)
    }

    /// Delete a signature, its image and the outputs signed with it
    pub fn delete_signature(&mut self, user: &User, signature_id: Uuid) -> Result<()> {
        let signature = self.signature(signature_id)?;

        for signed in self.store.signed_documents()? {
            if signed.signature_id == signature.id {
                self.remove_signed(&signed)?;
            }
        }
        self.store.remove_signature(signature.id)?;
        self.media.delete(&signature.file_name)?;
        log::info!("User {} deleted signature {}", user.username, signature.id);

        self.notify_admins(ActivityKind::SignatureDeleted, user, &signature.id.to_string());
        Ok(())
    }

    // ---- Signing ----

    /// Place every requested signature and store the signed output
    pub fn apply_signature(&mut self, user: &User, request: &SignRequest) -> Result<ApplyResult> {
        let placements = request.placements();
        if placements.is_empty() {
            return Err(signing::SigningError::NoSignatures.into());
        }

        let document = self.document(parse_id(&request.document_id, "Document")?)?;
        let primary_id = match request.signature_id.trim() {
            "" => placements[0].signature_id.as_str(),
            id => id,
        };
        let primary = self.signature(parse_id(primary_id, "Signature")?)?;
        if !self.media.exists(&primary.file_name) {
            return Err(EsignError::Validation(format!(
                "Signature file not found: {}",
                primary.file_name
            )));
        }

        // Keyed by the id exactly as the request spells it
        let mut images: HashMap<String, Vec<u8>> = HashMap::new();
        for placement in &placements {
            if images.contains_key(&placement.signature_id) {
                continue;
            }
            let signature = self.signature(parse_id(&placement.signature_id, "Signature")?)?;
            match self.media.read(&signature.file_name) {
                Ok(bytes) => {
                    images.insert(placement.signature_id.clone(), bytes);
                }
                Err(EsignError::NotFound(_)) => {
                    log::warn!("Signature file not found: {}", signature.file_name);
                }
                Err(e) => return Err(e),
            }
        }

        let bytes = self.media.read(&document.file_name)?;
        log::info!(
            "Applying {} signature(s) to {} document {}",
            placements.len(),
            document.format,
            document.id
        );
        let outcome = match document.format {
            DocumentFormat::Pdf => sign_pdf(
                &bytes,
                &placements,
                &images,
                request.preview(),
                &self.placement,
            )?,
            DocumentFormat::Docx => sign_docx(&bytes, &placements, &images, &self.placement)?,
        };
        let Some(placed) = outcome.primary().cloned() else {
            return Err(EsignError::Validation(
                "None of the requested signatures could be placed".to_string(),
            ));
        };

        let output_name = match document.format {
            DocumentFormat::Pdf => format!("signed_{}_{}.pdf", document.id, primary.id),
            DocumentFormat::Docx => format!("signed_{}_{}_docx.docx", document.id, primary.id),
        };
        let stored = self
            .media
            .write(MediaKind::SignedDocuments, &output_name, &outcome.bytes)?;

        let signed = SignedDocument {
            id: Uuid::new_v4(),
            document_id: document.id,
            signature_id: primary.id,
            signer_id: user.id,
            file_name: stored,
            signed_at: Utc::now(),
            position_x: placed.x,
            position_y: placed.y,
            page: placed.page,
        };
        self.store.save_signed_document(signed.clone())?;

        let title = document.title.clone();
        self.store.save_document(Document {
            status: DocumentStatus::Signed,
            ..document
        })?;
        log::info!(
            "Signed document {} stored as {} ({} placed, {} skipped)",
            signed.document_id,
            signed.file_name,
            outcome.placed.len(),
            outcome.skipped.len()
        );

        self.notify_admins(ActivityKind::DocumentSigned, user, &title);

        Ok(ApplyResult {
            success: true,
            signed_document_id: signed.id,
            message: format!("{} signature(s) applied successfully!", outcome.placed.len()),
            download_options: DownloadOptions::for_signed(signed.id),
            placed: outcome.placed,
            skipped: outcome.skipped,
        })
    }

    /// Signed output as an attachment named after the document title
    pub fn download_signed(&self, signed_id: Uuid) -> Result<Download> {
        let signed = self
            .store
            .signed_document(signed_id)?
            .ok_or_else(|| EsignError::NotFound("Signed document".to_string()))?;
        let bytes = self.media.read(&signed.file_name)?;

        let extension = signed
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let title = match self.store.document(signed.document_id)? {
            Some(document) => document.title,
            None => "document".to_string(),
        };
        Ok(Download {
            file_name: format!("signed_{}.{}", title.replace(' ', "_"), extension),
            content_type: content_type_for(&signed.file_name).to_string(),
            bytes,
        })
    }

    /// Files in `signed_documents/` that no record points at
    pub fn cleanup_orphaned_files(&self, delete: bool) -> Result<Vec<String>> {
        let referenced: HashSet<String> = self
            .store
            .signed_documents()?
            .into_iter()
            .map(|s| s.file_name)
            .collect();

        let orphans: Vec<String> = self
            .media
            .list(MediaKind::SignedDocuments)?
            .into_iter()
            .filter(|path| !referenced.contains(path))
            .collect();

        if delete {
            for path in &orphans {
                self.media.delete(path)?;
                log::info!("Deleted orphaned file {}", path);
            }
        } else if !orphans.is_empty() {
            log::info!("Found {} orphaned signed file(s)", orphans.len());
        }
        Ok(orphans)
    }

    // ---- Invitations ----

    /// Email a signing link for a document
    ///
    /// Returns `None` when the mail could not be sent; the invitation is
    /// still recorded.
    pub fn send_invitation(
        &mut self,
        sender: &User,
        document_id: Uuid,
        recipient_email: &str,
        recipient_name: &str,
    ) -> Result<Option<Invitation>> {
        if !sender.is_staff {
            return Err(EsignError::PermissionDenied(
                "only staff can send invitations".to_string(),
            ));
        }
        let recipient_email = recipient_email.trim();
        if recipient_email.is_empty() {
            return Err(EsignError::Validation("Recipient email is required".to_string()));
        }
        let document = self.document(document_id)?;

        let sent_at = Utc::now();
        let invitation = Invitation {
            id: Uuid::new_v4(),
            document_id: document.id,
            sent_by: sender.id,
            recipient_email: recipient_email.to_string(),
            recipient_name: recipient_name.trim().to_string(),
            token: Uuid::new_v4(),
            sent_at,
            expires_at: sent_at + Duration::days(self.config.invitation_ttl_days),
            accepted: false,
            accepted_at: None,
        };
        self.store.save_invitation(invitation.clone())?;

        let context = InvitationContext {
            recipient_name: if invitation.recipient_name.is_empty() {
                invitation.recipient_email.clone()
            } else {
                invitation.recipient_name.clone()
            },
            document_title: document.title.clone(),
            sender_name: sender.display_name().to_string(),
            sign_url: format!(
                "{}{}",
                self.config.site_base(),
                sign_path(document.id, invitation.token)
            ),
            expiration_date: InvitationContext::expiration(invitation.expires_at),
            site_name: self.config.site_name.clone(),
        };
        let email = render_invitation(&context);
        let message = EmailMessage {
            from: self.config.default_from_email.clone(),
            to: vec![invitation.recipient_email.clone()],
            subject: email.subject,
            body: email.text,
            html_body: Some(email.html),
        };

        match self.mailer.send(&message) {
            Ok(()) => {
                log::info!(
                    "Invitation for document {} sent to {}",
                    document.id,
                    invitation.recipient_email
                );
                Ok(Some(invitation))
            }
            Err(e) => {
                log::error!(
                    "Failed to send invitation to {}: {}",
                    invitation.recipient_email,
                    e
                );
                Ok(None)
            }
        }
    }

    /// Redeem an invitation token, returning the document to sign
    pub fn accept_invitation(&mut self, document_id: Uuid, token: Uuid) -> Result<Document> {
        let document = self.document(document_id)?;
        let mut invitation = self
            .store
            .invitation(document.id, token)?
            .ok_or_else(|| EsignError::NotFound("Invitation".to_string()))?;

        let now = Utc::now();
        if invitation.is_expired(now) {
            return Err(EsignError::InvitationExpired);
        }
        if invitation.accepted {
            return Err(EsignError::InvitationUsed);
        }

        invitation.accepted = true;
        invitation.accepted_at = Some(now);
        self.store.save_invitation(invitation)?;
        log::info!("Invitation accepted for document {}", document.id);
        Ok(document)
    }

    // ---- Notifications ----

    /// Tell administrators a user logged in; super users are not reported
    pub fn notify_user_login(&self, user: &User) -> bool {
        if user.is_superuser {
            return false;
        }
        self.notify_admins(ActivityKind::UserLogin, user, "")
    }

    /// Email administrators about an activity, returning whether mail went out
    ///
    /// Never fails: a mail error is logged and reported as `false`.
    pub fn notify_admins(&self, kind: ActivityKind, user: &User, subject: &str) -> bool {
        if !self.config.admin_notifications_enabled {
            log::info!("Admin notifications disabled, skipping {:?}", kind);
            return false;
        }
        let users = match self.store.users() {
            Ok(users) => users,
            Err(e) => {
                log::error!("Cannot load administrators: {}", e);
                return false;
            }
        };
        let recipients = admin_recipients(&users, &self.config.additional_admin_emails);
        if recipients.is_empty() {
            log::warn!("No admin recipients configured, skipping {:?}", kind);
            return false;
        }

        let (mail_subject, body) = activity_message(kind, user, subject, Utc::now());
        let message = EmailMessage {
            from: self.config.default_from_email.clone(),
            to: recipients,
            subject: mail_subject,
            body,
            html_body: None,
        };
        match self.mailer.send(&message) {
            Ok(()) => {
                log::info!("Admin notification sent: {}", message.subject);
                true
            }
            Err(e) => {
                log::error!("Failed to send admin notification {:?}: {}", kind, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("signed_documents/a.pdf"), "application/pdf");
        assert_eq!(
            content_type_for("documents/a.DOCX"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(content_type_for("signatures/a.png"), OCTET_STREAM);
        assert_eq!(content_type_for("noext"), OCTET_STREAM);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(&Uuid::nil().to_string(), "Document").unwrap(), Uuid::nil());
        assert!(matches!(
            parse_id("not-a-uuid", "Document"),
            Err(EsignError::NotFound(_))
        ));
    }
}
