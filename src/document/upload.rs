use super::models::{
    Branch, Category, FileType, NewDocument, MAX_DESCRIPTION_LENGTH, MAX_SUBJECT_LENGTH,
};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 50;
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    ".pdf", ".ppt", ".pptx", ".doc", ".docx", ".txt", ".jpg", ".jpeg", ".png", ".zip", ".rar",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("The uploaded file is empty")]
    EmptyFile,
    #[error("File size must not exceed {max_mb} MB (got {size} bytes)")]
    FileTooLarge { size: u64, max_mb: u64 },
    #[error("File type '{0}' is not allowed")]
    ExtensionNotAllowed(String),
    #[error("{0}")]
    InvalidField(String),
}

/// Limits applied to every uploaded file before it reaches storage.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_file_size_mb: u64,
    allowed_extensions: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_FILE_SIZE_MB,
            DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        )
    }
}

impl UploadPolicy {
    /// Extensions are matched case-insensitively, with or without the leading dot.
    pub fn new(max_file_size_mb: u64, allowed_extensions: Vec<String>) -> Self {
        let allowed_extensions = allowed_extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        Self {
            max_file_size_mb,
            allowed_extensions,
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    pub fn check_file(&self, file_name: &str, size: u64) -> Result<(), UploadError> {
        if size == 0 {
            return Err(UploadError::EmptyFile);
        }
        if size > self.max_file_size_bytes() {
            return Err(UploadError::FileTooLarge {
                size,
                max_mb: self.max_file_size_mb,
            });
        }
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !self.allowed_extensions.iter().any(|a| *a == extension) {
            return Err(UploadError::ExtensionNotAllowed(if extension.is_empty() {
                file_name.to_string()
            } else {
                format!(".{}", extension)
            }));
        }
        Ok(())
    }
}

/// A document upload as received from a client.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub branch: Branch,
    pub category: Category,
    pub file_type: FileType,
    pub subject: String,
    pub description: Option<String>,
    pub file_name: String,
    pub data: Vec<u8>,
}

impl DocumentUpload {
    /// Validates metadata and file, producing the record to insert for `owner_id`.
    pub fn into_new_document(
        self,
        owner_id: usize,
        policy: &UploadPolicy,
    ) -> Result<(NewDocument, Vec<u8>), UploadError> {
        let subject = self.subject.trim().to_string();
        if subject.is_empty() {
            return Err(UploadError::InvalidField("Subject is required".to_string()));
        }
        if subject.chars().count() > MAX_SUBJECT_LENGTH {
            return Err(UploadError::InvalidField(format!(
                "Subject must be at most {} characters",
                MAX_SUBJECT_LENGTH
            )));
        }
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if description
            .as_deref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH)
        {
            return Err(UploadError::InvalidField(format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }
        let file_name = Path::new(&self.file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        policy.check_file(&file_name, self.data.len() as u64)?;

        Ok((
            NewDocument {
                owner_id,
                branch: self.branch,
                subject,
                category: self.category,
                file_type: self.file_type,
                description,
                file_name,
            },
            self.data,
        ))
    }
}
