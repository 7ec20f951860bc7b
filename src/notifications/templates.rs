//! Plain-text email rendering for every notification kind.

use super::models::{DocumentNotice, Notification, StatusNoticeKind};
use serde::Serialize;

pub const PORTAL_NAME: &str = "Academic Resource Portal";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

pub fn render(notification: &Notification, sender_name: &str) -> RenderedEmail {
    match notification {
        Notification::DocumentStatus { kind, document } => {
            render_document_status(*kind, document, sender_name)
        }
        Notification::Welcome { first_name } => RenderedEmail {
            subject: format!("Welcome to the {}", PORTAL_NAME),
            body: format!(
                "Hello {first_name},\n\n\
                 Welcome! Your account has been successfully created.\n\n\
                 You can now:\n\
                 - Upload educational documents (notes, model papers, guidance materials)\n\
                 - Access approved documents from other students\n\
                 - Organize resources by branch and category\n\n\
                 All uploaded documents go through an admin approval process before becoming \
                 visible to other students.\n\n\
                 Best regards,\n{sender_name}\n"
            ),
        },
        Notification::ContactReceived {
            full_name,
            email,
            subject,
        } => RenderedEmail {
            subject: format!("Thank you for contacting the {}", PORTAL_NAME),
            body: format!(
                "Hello {full_name},\n\n\
                 Thank you for reaching out to us!\n\n\
                 We have received your message regarding: {subject}\n\n\
                 Our team will review your query and get back to you soon at {email}.\n\n\
                 Best regards,\n{sender_name}\n"
            ),
        },
    }
}

fn render_document_status(
    kind: StatusNoticeKind,
    document: &DocumentNotice,
    sender_name: &str,
) -> RenderedEmail {
    let details = format!(
        "Document Details:\n\
         - Subject: {}\n\
         - Branch: {}\n\
         - Category: {}\n\
         - Uploaded on: {}\n",
        document.subject,
        document.branch.label(),
        document.category.label(),
        document.upload_date.format("%Y-%m-%d"),
    );
    let (headline, closing) = match kind {
        StatusNoticeKind::Accepted => (
            "Good news! Your document has been approved.",
            "Your document is now visible to all students and available for download.\n\n\
             Thank you for contributing to the academic resource portal!",
        ),
        StatusNoticeKind::Rejected => (
            "We regret to inform you that your document has been rejected.",
            "Please ensure your document meets quality standards and try uploading again.",
        ),
    };
    RenderedEmail {
        subject: format!("Document Status Update - {}", document.subject),
        body: format!(
            "Hello {},\n\n{}\n\n{}\n{}\n\nBest regards,\n{}\n",
            document.owner_first_name, headline, details, closing, sender_name
        ),
    }
}
