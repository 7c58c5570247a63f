//! Error taxonomy for the client workflows.
//!
//! Two layers:
//! - [`ApiError`] describes what went wrong on the wire (HTTP status, network
//!   failure, undecodable payload).
//! - [`ClientError`] records *which workflow step* failed, wrapping the
//!   underlying [`ApiError`] so the backend message survives to the UI.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport-level failure of a single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{}", status_message(*status, body))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body, possibly empty.
        body: String,
    },

    /// The request never produced a response (DNS, CORS, connection reset).
    #[error("{0}")]
    Network(String),

    /// The response arrived but could not be decoded.
    #[error("Invalid response: {0}")]
    Decode(String),
}

fn status_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("Request failed with status code {status}")
    } else {
        body.to_string()
    }
}

impl ApiError {
    /// Backend message when present, otherwise a generic description.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status, if the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

/// Discriminant of [`ClientError`], stable across the JS boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NoFileSelected,
    SlotRequestFailed,
    DirectUploadFailed,
    MetadataCommitFailed,
    EmptyTransformation,
    TransformRejected,
    ListFetchFailed,
    DownloadUrlFailed,
    DeleteFailed,
    NotAuthenticated,
    InvalidCredentials,
    PasswordMismatch,
    PasswordTooShort,
    AuthenticationFailed,
    RegistrationFailed,
    OperationInProgress,
}

/// A workflow failure, tagged with the step at which it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Please select a file to upload")]
    NoFileSelected,

    #[error("Failed to request upload slot: {0}")]
    SlotRequestFailed(ApiError),

    #[error("Direct upload failed: {0}")]
    DirectUploadFailed(ApiError),

    #[error("Failed to save image metadata: {0}")]
    MetadataCommitFailed(ApiError),

    #[error("No transformations selected")]
    EmptyTransformation,

    #[error("Transformation rejected: {0}")]
    TransformRejected(ApiError),

    #[error("Failed to load images: {0}")]
    ListFetchFailed(ApiError),

    #[error("Failed to get download URL: {0}")]
    DownloadUrlFailed(ApiError),

    #[error("Failed to delete image: {0}")]
    DeleteFailed(ApiError),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Username and password are required")]
    InvalidCredentials,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(ApiError),

    #[error("Registration rejected: {0}")]
    RegistrationFailed(ApiError),

    #[error("Another {0} is already in progress")]
    OperationInProgress(&'static str),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NoFileSelected => ErrorKind::NoFileSelected,
            ClientError::SlotRequestFailed(_) => ErrorKind::SlotRequestFailed,
            ClientError::DirectUploadFailed(_) => ErrorKind::DirectUploadFailed,
            ClientError::MetadataCommitFailed(_) => ErrorKind::MetadataCommitFailed,
            ClientError::EmptyTransformation => ErrorKind::EmptyTransformation,
            ClientError::TransformRejected(_) => ErrorKind::TransformRejected,
            ClientError::ListFetchFailed(_) => ErrorKind::ListFetchFailed,
            ClientError::DownloadUrlFailed(_) => ErrorKind::DownloadUrlFailed,
            ClientError::DeleteFailed(_) => ErrorKind::DeleteFailed,
            ClientError::NotAuthenticated => ErrorKind::NotAuthenticated,
            ClientError::InvalidCredentials => ErrorKind::InvalidCredentials,
            ClientError::PasswordMismatch => ErrorKind::PasswordMismatch,
            ClientError::PasswordTooShort(_) => ErrorKind::PasswordTooShort,
            ClientError::AuthenticationFailed(_) => ErrorKind::AuthenticationFailed,
            ClientError::RegistrationFailed(_) => ErrorKind::RegistrationFailed,
            ClientError::OperationInProgress(_) => ErrorKind::OperationInProgress,
        }
    }

    /// The wire-level cause, if this error came from a request.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::SlotRequestFailed(e)
            | ClientError::DirectUploadFailed(e)
            | ClientError::MetadataCommitFailed(e)
            | ClientError::TransformRejected(e)
            | ClientError::ListFetchFailed(e)
            | ClientError::DownloadUrlFailed(e)
            | ClientError::DeleteFailed(e)
            | ClientError::AuthenticationFailed(e)
            | ClientError::RegistrationFailed(e) => Some(e),
            _ => None,
        }
    }

    /// Failed list fetches degrade to an empty list instead of blocking the UI.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ClientError::ListFetchFailed(_))
    }

    /// Message shown to the user at the boundary of the triggering action.
    ///
    /// Network-originated errors carry the backend's message verbatim
    /// (or the generic transport description when the body was empty),
    /// prefixed by the action that failed.
    pub fn user_message(&self) -> String {
        let detail = self
            .api_error()
            .map(ApiError::message)
            .unwrap_or_else(|| self.to_string());
        match self.kind() {
            ErrorKind::NoFileSelected
            | ErrorKind::NotAuthenticated
            | ErrorKind::InvalidCredentials
            | ErrorKind::PasswordMismatch
            | ErrorKind::PasswordTooShort
            | ErrorKind::OperationInProgress => detail,
            ErrorKind::SlotRequestFailed
            | ErrorKind::DirectUploadFailed
            | ErrorKind::MetadataCommitFailed => format!("Upload failed: {detail}"),
            ErrorKind::EmptyTransformation | ErrorKind::TransformRejected => {
                format!("Transformation failed: {detail}")
            }
            ErrorKind::ListFetchFailed => format!("Could not load images: {detail}"),
            ErrorKind::DownloadUrlFailed => format!("Download failed: {detail}"),
            ErrorKind::DeleteFailed => format!("Delete failed: {detail}"),
            ErrorKind::AuthenticationFailed => format!("Login failed: {detail}"),
            ErrorKind::RegistrationFailed => format!("Registration failed: {detail}"),
        }
    }
}
