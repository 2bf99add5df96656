//! Common error types for rollcall

use thiserror::Error;

/// Common result type for rollcall operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared across the rollcall crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ledger file read/write error (wraps csv::Error)
    #[error("Ledger error: {0}")]
    Ledger(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or undecodable image bytes
    #[error("Image decode error: {0}")]
    Decode(String),

    /// Identity resolver failure (embedding extraction)
    #[error("Resolver error: {0}")]
    Resolver(String),

    /// Report delivery failure
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
