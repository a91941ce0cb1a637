//! Error types for connection operations.
//!
//! Every failure a [`Connection`](crate::Connection) can report falls into one
//! of three kinds: the transport broke, the session was in the wrong state for
//! the request, or KeePassXC answered with an error (or something unparsable).

use std::fmt;
use thiserror::Error;

/// The unified error type for connection operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Socket or named-pipe failures.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The request is not valid in the current session state
    /// (not connected, not associated, bad arguments).
    #[error("illegal state: {message}")]
    IllegalState { message: String },

    /// KeePassXC returned an error, or a response that could not be parsed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl Error {
    /// Shorthand for an [`Error::IllegalState`].
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Error::IllegalState {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Transport(TransportError::Io(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Protocol(ProtocolError::malformed(err.to_string()))
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The proxy socket could not be reached.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// No response arrived in time.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Read or write on the socket failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection.
    #[error("connection closed")]
    Closed,
}

/// Error code KeePassXC sends when no database is open (or it is locked).
pub const DATABASE_NOT_OPENED: &str = "1";

/// Protocol-level errors reported by KeePassXC.
#[derive(Debug)]
pub struct ProtocolError {
    /// KeePassXC `errorCode` (if present).
    pub code: Option<String>,
    /// KeePassXC `error` message.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "[{}] {}", code, message),
            (Some(code), None) => write!(f, "[{}]", code),
            (None, Some(message)) => write!(f, "{}", message),
            (None, None) => write!(f, "unknown error"),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(code: Option<String>, message: Option<String>) -> Self {
        Self { code, message }
    }

    /// A response that did not have the expected shape.
    pub fn malformed(detail: impl fmt::Display) -> Self {
        Self {
            code: None,
            message: Some(format!("malformed response: {}", detail)),
        }
    }

    /// Check if KeePassXC reported that no database is open.
    pub fn is_database_not_opened(&self) -> bool {
        self.code.as_deref() == Some(DATABASE_NOT_OPENED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_display_includes_code_and_message() {
        let err = ProtocolError::new(Some("1".into()), Some("Database not opened".into()));
        assert_eq!(err.to_string(), "[1] Database not opened");
        assert!(err.is_database_not_opened());
    }

    #[test]
    fn json_errors_become_malformed_protocol_errors() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err = Error::from(json_err);
        match err {
            Error::Protocol(inner) => {
                assert!(inner.code.is_none());
                assert!(inner.to_string().starts_with("malformed response"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn io_errors_are_transport_errors() {
        let err = Error::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(matches!(err, Error::Transport(TransportError::Io(_))));
    }
}
