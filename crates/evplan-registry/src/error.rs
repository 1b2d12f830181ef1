//! Error types for registry operations.

use std::io;
use std::path::PathBuf;

use evplan_types::TypesError;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No record with this key is stored.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// Every slot was probed without finding room for the record.
    #[error("no free slot within {capacity} probes; resize the registry")]
    CapacityExceeded { capacity: usize },

    /// A resize target cannot hold the live records under the load factor.
    #[error("capacity {requested} too small, at least {required} slots needed")]
    CapacityTooSmall { requested: usize, required: usize },

    /// A requested capacity is above the largest supported one.
    #[error("capacity {requested} too large, at most {max} slots supported")]
    CapacityTooLarge { requested: usize, max: usize },

    /// The slot array for a capacity could not be allocated.
    #[error("could not allocate {capacity} slots")]
    OutOfMemory { capacity: usize },

    /// The record key is invalid.
    #[error("invalid record key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// The encoded record would exceed the largest entry a registry file holds.
    #[error("record {key:?} encodes to {size} bytes, maximum is {max}")]
    RecordTooLarge { key: String, size: u64, max: u64 },

    /// A configuration value is out of range.
    #[error("invalid registry config: {0}")]
    InvalidConfig(String),

    /// I/O failure while reading or writing a registry file.
    #[error("persistence error at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The registry file is malformed.
    #[error("malformed registry file {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// A record could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<TypesError> for RegistryError {
    fn from(e: TypesError) -> Self {
        match e {
            TypesError::InvalidKey { key, reason } => Self::InvalidKey { key, reason },
            TypesError::Payload(reason) => Self::Serialization(reason),
        }
    }
}

impl RegistryError {
    pub(crate) fn not_found(key: &str) -> Self {
        Self::NotFound {
            key: key.to_string(),
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
