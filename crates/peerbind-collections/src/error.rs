//! Collection errors

use thiserror::Error;

/// Result type for collection operations
pub type CollectionResult<T> = Result<T, CollectionError>;

/// Errors raised by [`List`](crate::List) accessors and mutators
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectionError {
    /// Index outside `1..=count`
    #[error("Index {index} out of range (count: {count})")]
    IndexOutOfRange {
        /// Requested 1-based index
        index: usize,
        /// Number of elements at the time of the call
        count: usize,
    },

    /// Operation needs at least one element
    #[error("Cannot {operation} on an empty list")]
    Empty {
        /// Name of the rejected operation
        operation: &'static str,
    },
}
