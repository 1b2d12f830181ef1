//! Error types for list operations.

use thiserror::Error;

/// Errors that can occur during list operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XorListError {
    /// No node holds the requested value.
    #[error("value not found in list")]
    NotFound,

    /// Every handle value is in use.
    #[error("arena exhausted: {slots} slots allocated")]
    ArenaExhausted { slots: usize },
}

/// Convenience type alias for list operations.
pub type Result<T> = std::result::Result<T, XorListError>;
