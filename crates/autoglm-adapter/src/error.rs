/*
[INPUT]:  Error sources (handshake, socket, serialization, endpoint parsing)
[OUTPUT]: Structured error types for the transport and protocol layer
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use std::time::Duration;
use thiserror::Error;

/// Main error type for the AutoGLM adapter
#[derive(Error, Debug)]
pub enum AutoglmError {
    /// Handshake did not complete within the readiness window
    #[error("Connection timeout after {duration:?}")]
    ConnectTimeout { duration: Duration },

    /// WebSocket handshake or socket failure
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Send attempted while the connection is not live
    #[error("WebSocket not connected")]
    NotConnected,

    /// A connection was already opened by this client instance
    #[error("WebSocket already connected")]
    AlreadyConnected,

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Endpoint URL could not be parsed
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// Endpoint uses a scheme other than ws/wss
    #[error("Unsupported endpoint scheme: {0}")]
    UnsupportedScheme(String),

    /// Credential cannot be carried in an HTTP header
    #[error("Invalid authorization header: {0}")]
    InvalidHeader(String),

    /// Operator or signal interrupted the task
    #[error("Task cancelled")]
    Cancelled,
}

impl AutoglmError {
    /// Errors raised while opening the connection
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            AutoglmError::ConnectTimeout { .. }
                | AutoglmError::WebSocket(_)
                | AutoglmError::InvalidEndpoint(_)
                | AutoglmError::UnsupportedScheme(_)
                | AutoglmError::InvalidHeader(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AutoglmError::ConnectTimeout { .. })
    }
}

/// Result type alias for AutoGLM operations
pub type Result<T> = std::result::Result<T, AutoglmError>;
