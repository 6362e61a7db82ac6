use thiserror::Error;

use crate::layout::DecodeError;

/// Common error type for pfgraph components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pickle serialization error: {0}")]
    Pickle(#[from] serde_pickle::Error),

    #[error("Unexpected pickle payload: {0}")]
    PickleShape(String),

    #[error("Plaintext protocol error: {0}")]
    Plaintext(String),

    #[error("Framing error: {0}")]
    Frame(String),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Result type alias using pfgraph's Error.
pub type Result<T> = std::result::Result<T, Error>;
