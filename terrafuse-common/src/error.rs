//! Common error types for TerraFuse

use thiserror::Error;

/// Common result type for TerraFuse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across TerraFuse crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or out-of-range value
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
