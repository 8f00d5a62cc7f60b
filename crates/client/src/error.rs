//! Unified client error type.
//!
//! Every backend-touching operation returns `Result<T, ClientError>`. The
//! variants follow the failure taxonomy the views care about: network and
//! backend failures become dismissible notices, validation failures never
//! reach the wire, auth failures trigger a redirect.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure talking to the backend.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// A row could not be decoded into its typed model.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Rejected before dispatch; no call was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// No signed-in session, or the session is no longer valid.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The referenced row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The change-feed connection failed or closed.
    #[error("feed error: {0}")]
    Feed(String),
}

impl ClientError {
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Short human-readable text for the dismissible notice a view shows.
    pub fn notice(&self) -> String {
        match self {
            ClientError::Network(_) => "Could not reach the server".into(),
            ClientError::Backend { message, .. } => message.clone(),
            ClientError::Decode(_) => "Received an unexpected response".into(),
            ClientError::Validation(m) => m.clone(),
            ClientError::NotAuthenticated => "Please sign in".into(),
            ClientError::NotFound(m) => format!("Not found: {m}"),
            ClientError::Feed(_) => "Live updates interrupted".into(),
        }
    }
}
