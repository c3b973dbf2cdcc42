//! Error types for the boletin library.

use std::io;
use thiserror::Error;

/// Result type alias for boletin operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while fetching, composing or reading a bulletin.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The HTTP request could not be completed (connection, timeout, TLS).
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {detail}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message from the response body, or a generic status line
        detail: String,
    },

    /// A response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The bulletin record came back without an id.
    #[error("Bulletin not found")]
    MissingBulletinId,

    /// The bulletin has no summaries to render.
    #[error("No summaries for bulletin {0}")]
    EmptyBulletin(i64),

    /// Error while writing or reading PDF structure.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Error while building the page tree or serializing it.
    #[error("Rendering error: {0}")]
    Render(String),

    /// A date string could not be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The speech engine rejected a command.
    #[error("Speech error: {0}")]
    Speech(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for the informational "nothing to show" state rather than a failure.
    pub fn is_empty_content(&self) -> bool {
        matches!(self, Error::EmptyBulletin(_) | Error::MissingBulletinId)
    }

    /// True when repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) => true,
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EmptyBulletin(12);
        assert_eq!(err.to_string(), "No summaries for bulletin 12");

        let err = Error::Api {
            status: 404,
            detail: "Boletín no encontrado".to_string(),
        };
        assert_eq!(err.to_string(), "API error (404): Boletín no encontrado");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_empty_content_is_not_a_failure() {
        assert!(Error::EmptyBulletin(3).is_empty_content());
        assert!(Error::MissingBulletinId.is_empty_content());
        assert!(!Error::Render("x".into()).is_empty_content());
    }

    #[test]
    fn test_retryable() {
        let server = Error::Api {
            status: 503,
            detail: "unavailable".into(),
        };
        let client = Error::Api {
            status: 422,
            detail: "bad".into(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(!Error::MissingBulletinId.is_retryable());
    }
}
