//! Administrator activity notifications

use crate::models::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// User activity administrators are told about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    UserLogin,
    DocumentSigned,
    DocumentUploaded,
    SignatureCreated,
    DocumentDeleted,
    SignatureDeleted,
}

fn underline(title: &str) -> String {
    format!("{title}\n{}", "=".repeat(title.len()))
}

/// Subject and plain-text body for an activity
///
/// `subject` is the document title for document activity and the
/// signature id for signature deletion; it is ignored otherwise.
pub fn activity_message(
    kind: ActivityKind,
    user: &User,
    subject: &str,
    at: DateTime<Utc>,
) -> (String, String) {
    let time = at.format(TIME_FORMAT);
    let user_name = &user.username;
    match kind {
        ActivityKind::UserLogin => {
            let email = if user.email.is_empty() {
                "Not provided"
            } else {
                user.email.as_str()
            };
            (
                format!("User Login: {user_name}"),
                format!(
                    "{}\n\nUser: {user_name}\nEmail: {email}\nLogin Time: {time}\n\n\
                     This is an automated notification that a user has logged into the eSignature system.",
                    underline("User Login Notification")
                ),
            )
        }
        ActivityKind::DocumentSigned => (
            format!("Document Signed: {subject}"),
            format!(
                "{}\n\nUser: {user_name}\nDocument: {subject}\nSigned Time: {time}\n\n\
                 The document has been successfully signed by the user.",
                underline("Document Signed Notification")
            ),
        ),
        ActivityKind::DocumentUploaded => (
            format!("Document Uploaded: {subject}"),
            format!(
                "{}\n\nUser: {user_name}\nDocument: {subject}\nUpload Time: {time}\n\n\
                 A new document has been uploaded to the system.",
                underline("Document Upload Notification")
            ),
        ),
        ActivityKind::SignatureCreated => (
            format!("Signature Created: {user_name}"),
            format!(
                "{}\n\nUser: {user_name}\nCreation Time: {time}\n\n\
                 A new signature has been created by the user.",
                underline("Signature Creation Notification")
            ),
        ),
        ActivityKind::DocumentDeleted => (
            format!("Document Deleted: {subject}"),
            format!(
                "{}\n\nUser: {user_name}\nDocument: {subject}\nDeletion Time: {time}\n\n\
                 A document has been deleted from the system.",
                underline("Document Deletion Notification")
            ),
        ),
        ActivityKind::SignatureDeleted => (
            format!("Signature Deleted: {subject}"),
            format!(
                "{}\n\nUser: {user_name}\nSignature ID: {subject}\nDeletion Time: {time}\n\n\
                 A signature has been deleted from the system.",
                underline("Signature Deletion Notification")
            ),
        ),
    }
}

/// Super users with an email, then the extra addresses, without duplicates
pub fn admin_recipients(users: &[User], additional: &[String]) -> Vec<String> {
    let mut recipients: Vec<String> = Vec::new();
    let candidates = users
        .iter()
        .filter(|u| u.is_superuser)
        .map(|u| u.email.trim())
        .chain(additional.iter().map(|e| e.trim()));
    for email in candidates {
        if !email.is_empty() && !recipients.iter().any(|r| r.eq_ignore_ascii_case(email)) {
            recipients.push(email.to_string());
        }
    }
    recipients
}
