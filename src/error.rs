use serde::Deserialize;

use crate::session::SessionError;
use crate::storage::ImageStoreError;

/// Error body shape returned by the remote API on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// Missing or malformed form / route input. Raised before any network call.
    #[error("validation failed: {0}")]
    Validation(String),
    /// No usable credential in the session store.
    #[error("unauthorized")]
    Unauthorized,
    /// No response received (connection failure, timeout).
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote error {status}: {message}")]
    Remote { status: u16, message: String },
    /// 2xx response whose body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("image upload failed: {0}")]
    ImageUpload(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ClientError::Validation(msg.into())
    }

    /// Status code for remote errors, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::InvalidResponse(e.to_string())
        } else if let Some(status) = e.status() {
            ClientError::Remote { status: status.as_u16(), message: e.to_string() }
        } else {
            // connect / timeout / request build failures: nothing came back
            ClientError::Transport(e.to_string())
        }
    }
}

impl From<ImageStoreError> for ClientError {
    fn from(e: ImageStoreError) -> Self {
        ClientError::ImageUpload(e.to_string())
    }
}
