use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Document {0} not found")]
    NotFound(usize),
    #[error("Not allowed: {0}")]
    Authorization(String),
    #[error("Invalid status '{0}', expected one of pending, Accept, Reject")]
    InvalidStatus(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
