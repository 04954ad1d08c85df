//! Peerbind Core Runtime
//!
//! This crate provides the object and identity layer that host wrappers
//! are built on:
//! - Prototype classes with snapshot variants ([`Class`], [`ClassBuilder`])
//! - Instances with free-form fields resolved through their class ([`Instance`])
//! - Peer-bound classes keeping one wrapper per external handle ([`ClassWithPeer`])
//! - Dynamic values and native methods ([`Value`], [`Method`])
//!
//! Everything here is single-threaded: the handles are `Rc` based and are
//! neither `Send` nor `Sync`.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod class;
pub mod error;
pub mod instance;
pub mod options;
pub mod peer;
pub mod value;

pub use class::{Class, ClassBuilder, Initializer, CLASS_FIELD, NAME_FIELD, RESERVED_FIELDS};
pub use error::{RuntimeError, RuntimeResult};
pub use instance::Instance;
pub use options::{PeerCacheOptions, StaleReleasePolicy, STALE_RELEASE_ENV};
pub use peer::{ClassWithPeer, PeerGuard, PeerHandle, ReleaseOutcome, Wrapper};
pub use value::{Method, MethodFn, Value};

pub use peerbind_collections::{CollectionError, CollectionResult, List, ListIter, Map};
