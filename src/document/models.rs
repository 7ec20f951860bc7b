use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Declares a closed set of string-valued choices stored and exchanged by their wire value.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => ($wire:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Exact match on the wire value.
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                $name::parse(s).ok_or_else(|| {
                    FromSqlError::Other(
                        format!("invalid {} value: {}", stringify!($name), s).into(),
                    )
                })
            }
        }
    };
}

choice_enum! {
    /// Moderation state of a document. Only `Accept` documents are publicly visible.
    pub enum DocumentStatus {
        Pending => ("pending", "Pending"),
        Accept => ("Accept", "Accepted"),
        Reject => ("Reject", "Rejected"),
    }
}

choice_enum! {
    pub enum Branch {
        ComputerScience => ("Computer Science", "Computer Science"),
        Mechanical => ("Mechanical", "Mechanical"),
        Civil => ("Civil", "Civil"),
        Electronics => ("Electronics", "Electronics"),
        Electric => ("Electric", "Electric"),
        It => ("IT", "Information Technology"),
    }
}

choice_enum! {
    pub enum Category {
        Notes => ("Notes", "Notes"),
        ModelPapers => ("ModelPapers", "Model Papers"),
        Guidance => ("Guidance", "Career Guidance"),
    }
}

choice_enum! {
    pub enum FileType {
        Pdf => ("PDF", "PDF"),
        Ppt => ("PPT", "PowerPoint"),
        Doc => ("DOC", "Word Document"),
        Txt => ("TXT", "Text File"),
        Image => ("Image", "Image"),
        Zip => ("ZIP", "Compressed File"),
    }
}

pub const MAX_SUBJECT_LENGTH: usize = 30;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: usize,
    pub owner_id: usize,
    pub upload_date: NaiveDate,
    pub branch: Branch,
    pub subject: String,
    pub category: Category,
    pub file_type: FileType,
    pub description: Option<String>,
    pub status: DocumentStatus,
    pub download_count: u64,
    /// Name of the file as uploaded; the stored blob is keyed by `id`.
    pub file_name: String,
}

/// A document as shown in lists, together with the owner's display names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentListing {
    #[serde(flatten)]
    pub document: Document,
    pub owner_first_name: String,
    pub owner_last_name: String,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub owner_id: usize,
    pub branch: Branch,
    pub subject: String,
    pub category: Category,
    pub file_type: FileType,
    pub description: Option<String>,
    pub file_name: String,
}

/// Result of an atomic status update: the status the document had before and the
/// document as persisted afterwards.
#[derive(Debug, Clone)]
pub struct StatusTransition {
    pub previous: DocumentStatus,
    pub document: Document,
}

impl StatusTransition {
    pub fn current(&self) -> DocumentStatus {
        self.document.status
    }

    pub fn changed(&self) -> bool {
        self.previous != self.document.status
    }
}

/// Outcome of a delete guarded by an authorization check run inside the same transaction.
#[derive(Debug, Clone)]
pub enum GuardedDelete {
    Deleted(Document),
    NotFound,
    Refused,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.accepted + self.rejected
    }
}
