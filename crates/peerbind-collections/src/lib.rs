//! Peerbind Collections
//!
//! General-purpose storage shared by the runtime and its collaborators:
//! - [`List`]: dense, 1-based ordered sequence
//! - [`Map`]: associative container with at most one value per key

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod list;
pub mod map;

pub use error::{CollectionError, CollectionResult};
pub use list::{List, ListIter};
pub use map::Map;
