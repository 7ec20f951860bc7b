use crate::contact::ContactError;
use crate::document::{BlobError, DocumentError};
use crate::moderation::ModerationError;
use crate::user::AccountError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// An error answered as `{"error": "..."}` with the given status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Logs the cause and hides it from the client.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        error!("Internal error: {}", cause);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::internal(err)
    }
}

impl From<ModerationError> for ApiError {
    fn from(err: ModerationError) -> Self {
        match err {
            ModerationError::NotFound(_) => ApiError::not_found(err.to_string()),
            ModerationError::Authorization(_) => ApiError::forbidden(err.to_string()),
            ModerationError::InvalidStatus(_) => ApiError::bad_request(err.to_string()),
            ModerationError::Store(err) => ApiError::internal(err),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound(_) => ApiError::not_found(err.to_string()),
            DocumentError::Upload(_) => ApiError::bad_request(err.to_string()),
            DocumentError::Blob(BlobError::NotFound(id)) => {
                error!("Document {} has no stored file", id);
                ApiError::not_found(format!("File of document {} not found", id))
            }
            DocumentError::Blob(err) => ApiError::internal(err),
            DocumentError::Store(err) => ApiError::internal(err),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Invalid(_) => ApiError::bad_request(err.to_string()),
            AccountError::EmailTaken(_) => ApiError::new(StatusCode::CONFLICT, err.to_string()),
            AccountError::InvalidCredentials => {
                ApiError::new(StatusCode::UNAUTHORIZED, err.to_string())
            }
            AccountError::NotFound(_) => ApiError::not_found(err.to_string()),
            AccountError::AdminProtected => ApiError::forbidden(err.to_string()),
            AccountError::Store(err) => ApiError::internal(err),
        }
    }
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::Invalid(_) => ApiError::bad_request(err.to_string()),
            ContactError::NotFound(_) => ApiError::not_found(err.to_string()),
            ContactError::Store(err) => ApiError::internal(err),
        }
    }
}
