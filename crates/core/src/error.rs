//! Centralized error types for the hrdesk workspace.

use thiserror::Error;

/// Message used when a failed response carries no readable error body.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Message used when a failed response is JSON but names no message.
pub const REQUEST_FAILED_MESSAGE: &str = "API request failed";

/// Top-level error enum. Variants map to failure layers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HrdeskError {
    /// The request never reached the server, or no response came back.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// The response body was not the JSON we expected.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl HrdeskError {
    /// Human-readable message surfaced to consumers.
    ///
    /// For server failures this is the server's own message, verbatim.
    pub fn message(&self) -> String {
        match self {
            Self::Request { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status of a server failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type HrdeskResult<T> = Result<T, HrdeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_message_is_verbatim() {
        let err = HrdeskError::Request {
            status: 500,
            message: "db down".into(),
        };
        assert_eq!(err.message(), "db down");
        assert_eq!(err.to_string(), "db down");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn other_variants_carry_their_prefix() {
        let err = HrdeskError::Transport("connection refused".into());
        assert_eq!(err.message(), "Transport error: connection refused");
        assert_eq!(err.status(), None);
    }
}
