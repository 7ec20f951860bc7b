//! Notification data models

use crate::document::{Branch, Category, Document, DocumentStatus};
use chrono::NaiveDate;
use serde::Serialize;

/// Which status email a moderated document triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusNoticeKind {
    Accepted,
    Rejected,
}

impl StatusNoticeKind {
    /// Returns None for statuses that never notify the owner.
    pub fn for_status(status: DocumentStatus) -> Option<Self> {
        match status {
            DocumentStatus::Accept => Some(StatusNoticeKind::Accepted),
            DocumentStatus::Reject => Some(StatusNoticeKind::Rejected),
            DocumentStatus::Pending => None,
        }
    }
}

/// Document metadata quoted in status emails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentNotice {
    pub document_id: usize,
    pub owner_first_name: String,
    pub subject: String,
    pub branch: Branch,
    pub category: Category,
    pub upload_date: NaiveDate,
}

impl DocumentNotice {
    pub fn new(document: &Document, owner_first_name: &str) -> Self {
        Self {
            document_id: document.id,
            owner_first_name: owner_first_name.to_string(),
            subject: document.subject.clone(),
            branch: document.branch,
            category: document.category,
            upload_date: document.upload_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    DocumentStatus {
        kind: StatusNoticeKind,
        document: DocumentNotice,
    },
    Welcome {
        first_name: String,
    },
    ContactReceived {
        full_name: String,
        email: String,
        subject: String,
    },
}
