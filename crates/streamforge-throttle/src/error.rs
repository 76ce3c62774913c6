//! Throttle Error Types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ThrottleError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThrottleError {
    /// A required collaborator was not supplied, or a config value is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
