//! Common error types for shelfscan

use thiserror::Error;

/// Common result type for shelfscan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared across shelfscan crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
