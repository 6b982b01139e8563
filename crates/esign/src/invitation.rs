//! Signing invitation emails

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Values substituted into the invitation email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvitationContext {
    pub recipient_name: String,
    pub document_title: String,
    pub sender_name: String,
    pub sign_url: String,
    /// e.g. "March 12, 2024"
    pub expiration_date: String,
    pub site_name: String,
}

impl InvitationContext {
    /// Format an expiry instant the way invitations display it
    pub fn expiration(at: DateTime<Utc>) -> String {
        at.format("%B %d, %Y").to_string()
    }
}

/// Rendered invitation, ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct InvitationEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Path of the token signing page for a document
pub fn sign_path(document_id: Uuid, token: Uuid) -> String {
    format!("/document/{document_id}/sign/{token}/")
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

pub fn render_invitation(ctx: &InvitationContext) -> InvitationEmail {
    let subject = format!("Document Signing Invitation: {}", ctx.document_title);

    let text = format!(
        "Hello {recipient},\n\n\
         {sender} has invited you to sign the document \"{title}\".\n\n\
         Open the link below to review and sign it:\n{url}\n\n\
         This invitation expires on {expires}.\n\n\
         {site}",
        recipient = ctx.recipient_name,
        sender = ctx.sender_name,
        title = ctx.document_title,
        url = ctx.sign_url,
        expires = ctx.expiration_date,
        site = ctx.site_name,
    );

    let html = format!(
        "<!DOCTYPE html>\n<html>\n<body>\n\
         <p>Hello {recipient},</p>\n\
         <p>{sender} has invited you to sign the document <strong>{title}</strong>.</p>\n\
         <p><a href=\"{url}\">Review and sign the document</a></p>\n\
         <p>This invitation expires on {expires}.</p>\n\
         <p>{site}</p>\n\
         </body>\n</html>\n",
        recipient = escape_html(&ctx.recipient_name),
        sender = escape_html(&ctx.sender_name),
        title = escape_html(&ctx.document_title),
        url = escape_html(&ctx.sign_url),
        expires = escape_html(&ctx.expiration_date),
        site = escape_html(&ctx.site_name),
    );

    InvitationEmail { subject, text, html }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn context() -> InvitationContext {
        InvitationContext {
            recipient_name: "Sam".to_string(),
            document_title: "Lease <2024>".to_string(),
            sender_name: "Jane Doe".to_string(),
            sign_url: "https://sign.example.com/document/d/sign/t/".to_string(),
            expiration_date: "March 12, 2024".to_string(),
            site_name: "E-Signature System".to_string(),
        }
    }

    #[test]
    fn test_expiration_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();
        assert_eq!(InvitationContext::expiration(at), "March 02, 2024");
    }

    #[test]
    fn test_render_text_and_html() {
        let email = render_invitation(&context());
        assert_eq!(email.subject, "Document Signing Invitation: Lease <2024>");
        assert!(email.text.starts_with("Hello Sam,"));
        assert!(email.text.contains("\"Lease <2024>\""));
        assert!(email.text.contains("https://sign.example.com/document/d/sign/t/"));
        assert!(email.html.contains("<strong>Lease &lt;2024&gt;</strong>"));
        assert!(email.html.contains("expires on March 12, 2024"));
    }

    #[test]
    fn test_sign_path() {
        assert_eq!(
            sign_path(Uuid::nil(), Uuid::nil()),
            "/document/00000000-0000-0000-0000-000000000000/sign/00000000-0000-0000-0000-000000000000/"
        );
    }
}
