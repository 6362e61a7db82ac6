//! Error types for the bridge framework.

use pfgraph_common::DecodeError;
use thiserror::Error;

/// Result type alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur in a bridge.
///
/// Every variant ends the current invocation; nothing is retried.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration parse error.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration validation error.
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// Raw record could not be decoded (underflow or bad layout).
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The privileged device call failed.
    #[error("Device error: {0}")]
    Device(String),

    /// No resolved address accepted a connection.
    #[error("Cannot connect to server {host}:{port}")]
    Connection { host: String, port: u16 },

    /// Writing the message failed after connecting.
    #[error("Failed to send metrics to {target}: {source}")]
    Transmit {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a configuration validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ConfigValidation(msg.into())
    }

    /// Create a device error.
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }
}

impl From<pfgraph_common::Error> for BridgeError {
    fn from(err: pfgraph_common::Error) -> Self {
        match err {
            pfgraph_common::Error::Config(msg) => Self::Config(msg),
            pfgraph_common::Error::Decode(e) => Self::Decode(e),
            other => Self::Serialization(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_message() {
        let err = BridgeError::Connection {
            host: "127.0.0.1".to_string(),
            port: 19999,
        };
        assert_eq!(err.to_string(), "Cannot connect to server 127.0.0.1:19999");
    }

    #[test]
    fn test_common_error_mapping() {
        let decode = pfgraph_common::Error::Decode(DecodeError::Underflow {
            needed: 420,
            available: 296,
        });
        assert!(matches!(
            BridgeError::from(decode),
            BridgeError::Decode(DecodeError::Underflow { needed: 420, .. })
        ));

        let frame = pfgraph_common::Error::Frame("too big".to_string());
        assert!(matches!(
            BridgeError::from(frame),
            BridgeError::Serialization(_)
        ));
    }
}
