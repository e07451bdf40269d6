use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up edge synthesis.
///
/// Degenerate input geometry is not an error: kernel functions return
/// `None` or an empty list and callers skip the affected beam.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid synthesis configuration: {0}")]
    InvalidConfig(String),
}
