use thiserror::Error;

/// Failure of a backend call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The backend answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Application { status: u16, message: String },
    /// A success response whose body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub const QUOTA_EXHAUSTED: u16 = 429;

    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, ApiError::Application { status, .. } if *status == Self::QUOTA_EXHAUSTED)
    }

    /// Text shown to the user for application errors, `None` for anything
    /// that should fall back to the generic network message.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ApiError::Application { message, .. } => Some(message),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("local storage is not available")]
    Unavailable,
    #[error("local storage rejected the write: {0}")]
    Rejected(String),
}

/// Local upload validation failure; raised before any request is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FileRejection {
    #[error("File type not supported. Allowed types: {allowed}")]
    UnsupportedType { allowed: String },
    #[error("File too large. Maximum size: {limit}")]
    TooLarge { limit: String },
    #[error("Cannot upload empty file")]
    Empty,
}
