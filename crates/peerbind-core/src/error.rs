//! Runtime errors

use peerbind_collections::CollectionError;
use thiserror::Error;

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors raised by classes, instances and peer caches
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuntimeError {
    /// List or map access failed
    #[error(transparent)]
    Collection(#[from] CollectionError),

    /// Attempt to store one of the name/type-tag keys
    #[error("Field '{0}' is reserved")]
    ReservedField(String),

    /// Lookup found no field in the instance or its class
    #[error("{class} has no field '{field}'")]
    MissingField {
        /// Class name
        class: String,
        /// Requested field
        field: String,
    },

    /// Field exists but does not hold a method
    #[error("Field '{field}' of {class} is {kind}, not a method")]
    NotCallable {
        /// Class name
        class: String,
        /// Requested field
        field: String,
        /// Kind of the stored value
        kind: &'static str,
    },

    /// Method called with the wrong number of arguments
    #[error("Method '{method}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        /// Method name
        method: String,
        /// Declared arity
        expected: usize,
        /// Number of arguments passed
        got: usize,
    },

    /// Release of a peer handle with no matching cache entry
    #[error("Stale release of peer {peer} on {class}")]
    StaleRelease {
        /// Class name
        class: String,
        /// Debug rendering of the peer handle
        peer: String,
    },

    /// Method body reported a failure
    #[error("Method failed: {0}")]
    MethodFailed(String),

    /// Configuration value could not be parsed
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl From<String> for RuntimeError {
    fn from(s: String) -> Self {
        RuntimeError::MethodFailed(s)
    }
}

impl From<&str> for RuntimeError {
    fn from(s: &str) -> Self {
        RuntimeError::MethodFailed(s.to_string())
    }
}
