//! Error types for the Placement client.

use thiserror::Error;

use crate::auth::AuthError;
use crate::placement::QueryError;

/// Primary error type for all Placement operations.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, PlacementError>;
