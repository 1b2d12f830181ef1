//! Error types for the foundation types crate.

/// Errors raised while building or decoding records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// The record key violates the key rules.
    #[error("invalid record key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// The payload could not be encoded or decoded.
    #[error("payload error: {0}")]
    Payload(String),
}

/// Convenience alias for results in this crate.
pub type TypesResult<T> = Result<T, TypesError>;
