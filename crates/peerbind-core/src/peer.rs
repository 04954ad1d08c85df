//! Peer-bound classes
//!
//! A [`ClassWithPeer`] wraps external handles ("peers") in instances of its
//! class and guarantees at most one live wrapper per distinct peer. Each
//! class owns its own cache:
//!
//! ```text
//! absent --acquire--> present(1) --acquire--> present(n + 1)
//! present(n > 1) --release--> present(n - 1)
//! present(1) --release--> absent
//! ```
//!
//! Every acquisition must be paired with exactly one release, either by
//! calling [`Wrapper::release`] / [`ClassWithPeer::free_instance`] or by
//! holding a [`PeerGuard`], which releases when dropped. After a handle
//! returns to `absent`, acquiring it again creates a new wrapper.

use crate::class::Class;
use crate::error::{RuntimeError, RuntimeResult};
use crate::instance::Instance;
use crate::options::{PeerCacheOptions, StaleReleasePolicy};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::fmt;
use std::hash::Hash;
use std::ops::Deref;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Requirements on an external handle
///
/// Handles are only compared and hashed, never dereferenced.
pub trait PeerHandle: Eq + Hash + Clone + fmt::Debug + 'static {}

impl<T> PeerHandle for T where T: Eq + Hash + Clone + fmt::Debug + 'static {}

/// Result of a successful release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Other acquisitions are still outstanding
    Retained {
        /// Live-reference count after the release
        remaining: usize,
    },
    /// Last acquisition released; the cache entry is gone
    Evicted,
    /// No matching cache entry; nothing changed
    Stale,
}

struct CacheEntry<P: PeerHandle> {
    wrapper: Wrapper<P>,
    count: usize,
}

struct PeerCache<P: PeerHandle> {
    class_name: String,
    options: PeerCacheOptions,
    entries: RefCell<FxHashMap<P, CacheEntry<P>>>,
}

impl<P: PeerHandle> PeerCache<P> {
    fn release(&self, wrapper: &Wrapper<P>) -> RuntimeResult<ReleaseOutcome> {
        let peer = wrapper.peer();
        let (outcome, evicted) = {
            let mut entries = self.entries.borrow_mut();
            match entries.get_mut(peer) {
                Some(entry) if entry.wrapper.ptr_eq(wrapper) => {
                    entry.count -= 1;
                    if entry.count == 0 {
                        (ReleaseOutcome::Evicted, entries.remove(peer))
                    } else {
                        let remaining = entry.count;
                        (ReleaseOutcome::Retained { remaining }, None)
                    }
                }
                _ => (ReleaseOutcome::Stale, None),
            }
        };

        match outcome {
            ReleaseOutcome::Retained { remaining } => {
                trace!(class = %self.class_name, peer = ?peer, count = remaining, "peer released");
            }
            ReleaseOutcome::Evicted => {
                debug!(class = %self.class_name, peer = ?peer, "peer evicted");
            }
            ReleaseOutcome::Stale => {
                return stale_release(self.options.stale_release, &self.class_name, peer);
            }
        }
        // Entry drops here, outside the borrow.
        drop(evicted);
        Ok(outcome)
    }
}

fn stale_release<P: PeerHandle>(
    policy: StaleReleasePolicy,
    class_name: &str,
    peer: &P,
) -> RuntimeResult<ReleaseOutcome> {
    match policy {
        StaleReleasePolicy::Ignore => Ok(ReleaseOutcome::Stale),
        StaleReleasePolicy::Warn => {
            warn!(class = %class_name, peer = ?peer, "release of peer with no live cache entry");
            Ok(ReleaseOutcome::Stale)
        }
        StaleReleasePolicy::Error => Err(RuntimeError::StaleRelease {
            class: class_name.to_string(),
            peer: format!("{:?}", peer),
        }),
    }
}

/// Instance bound to one peer handle
///
/// Derefs to the underlying [`Instance`], so class methods and fields are
/// reachable directly. Clones are the same wrapper; acquiring the same peer
/// again while it is live also yields this wrapper.
pub struct Wrapper<P: PeerHandle> {
    inner: Rc<WrapperInner<P>>,
}

struct WrapperInner<P: PeerHandle> {
    instance: Instance,
    peer: P,
    policy: StaleReleasePolicy,
    cache: Weak<PeerCache<P>>,
}

impl<P: PeerHandle> Wrapper<P> {
    /// The wrapped peer handle
    pub fn peer(&self) -> &P {
        &self.inner.peer
    }

    /// The underlying instance
    pub fn instance(&self) -> &Instance {
        &self.inner.instance
    }

    /// Give back one acquisition of this wrapper's peer
    ///
    /// The lookup goes through the cache of the class that created the
    /// wrapper. A wrapper whose entry is gone, or has been replaced by a
    /// newer wrapper for the same peer, is a stale release and is handled
    /// according to the class's [`StaleReleasePolicy`].
    pub fn release(&self) -> RuntimeResult<ReleaseOutcome> {
        match self.inner.cache.upgrade() {
            Some(cache) => cache.release(self),
            None => stale_release(
                self.inner.policy,
                self.inner.instance.class().name(),
                &self.inner.peer,
            ),
        }
    }

    /// Check if both handles refer to the same wrapper
    pub fn ptr_eq(&self, other: &Wrapper<P>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<P: PeerHandle> Clone for Wrapper<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P: PeerHandle> Deref for Wrapper<P> {
    type Target = Instance;

    fn deref(&self) -> &Instance {
        &self.inner.instance
    }
}

impl<P: PeerHandle> PartialEq for Wrapper<P> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<P: PeerHandle> Eq for Wrapper<P> {}

impl<P: PeerHandle> fmt::Debug for Wrapper<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapper")
            .field("class", &self.inner.instance.class().name())
            .field("peer", &self.inner.peer)
            .finish()
    }
}

/// Class whose instances wrap external peer handles
pub struct ClassWithPeer<P: PeerHandle> {
    class: Class,
    cache: Rc<PeerCache<P>>,
}

impl<P: PeerHandle> ClassWithPeer<P> {
    /// Create an empty peer-bound class with default options
    pub fn make(name: impl Into<String>) -> Self {
        Self::with_options(name, PeerCacheOptions::default())
    }

    /// Create an empty peer-bound class
    pub fn with_options(name: impl Into<String>, options: PeerCacheOptions) -> Self {
        Self::from_class(Class::make(name), options)
    }

    /// Bind a fresh peer cache to an existing class
    ///
    /// Useful with [`Class::make_variant`] or [`Class::builder`] to give the
    /// wrappers methods and an initializer.
    pub fn from_class(class: Class, options: PeerCacheOptions) -> Self {
        let cache = PeerCache {
            class_name: class.name().to_string(),
            entries: RefCell::new(FxHashMap::with_capacity_and_hasher(
                options.initial_capacity,
                Default::default(),
            )),
            options,
        };
        Self {
            class,
            cache: Rc::new(cache),
        }
    }

    /// The class wrappers are tagged with
    pub fn class(&self) -> &Class {
        &self.class
    }

    /// Class name
    pub fn name(&self) -> &str {
        self.class.name()
    }

    /// Cache options
    pub fn options(&self) -> &PeerCacheOptions {
        &self.cache.options
    }

    /// Acquire the wrapper for `peer`
    ///
    /// Returns the cached wrapper and bumps its count when `peer` is live,
    /// otherwise allocates a new wrapper with a count of one.
    pub fn make_instance(&self, peer: P) -> Wrapper<P> {
        if let Some(entry) = self.cache.entries.borrow_mut().get_mut(&peer) {
            entry.count += 1;
            trace!(class = %self.name(), peer = ?peer, count = entry.count, "peer acquired");
            return entry.wrapper.clone();
        }

        // The initializer may run arbitrary code, so allocate outside the borrow.
        let wrapper = Wrapper {
            inner: Rc::new(WrapperInner {
                instance: self.class.make_instance(),
                peer: peer.clone(),
                policy: self.cache.options.stale_release,
                cache: Rc::downgrade(&self.cache),
            }),
        };

        let mut entries = self.cache.entries.borrow_mut();
        match entries.entry(peer) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.count += 1;
                entry.wrapper.clone()
            }
            Entry::Vacant(vacant) => {
                debug!(class = %self.cache.class_name, peer = ?vacant.key(), "peer wrapped");
                vacant.insert(CacheEntry {
                    wrapper: wrapper.clone(),
                    count: 1,
                });
                wrapper
            }
        }
    }

    /// Alias for [`make_instance`](Self::make_instance)
    pub fn acquire(&self, peer: P) -> Wrapper<P> {
        self.make_instance(peer)
    }

    /// Acquire the wrapper for `peer`, releasing it when the guard drops
    pub fn acquire_scoped(&self, peer: P) -> PeerGuard<P> {
        PeerGuard::new(self.make_instance(peer))
    }

    /// Give back one acquisition of `wrapper`
    ///
    /// Same as [`Wrapper::release`].
    pub fn free_instance(&self, wrapper: &Wrapper<P>) -> RuntimeResult<ReleaseOutcome> {
        wrapper.release()
    }

    /// The peer handle stored in `wrapper`
    pub fn internal_representation<'w>(&self, wrapper: &'w Wrapper<P>) -> &'w P {
        wrapper.peer()
    }

    /// Live-reference count for `peer`, if it is cached
    pub fn live_count(&self, peer: &P) -> Option<usize> {
        self.cache.entries.borrow().get(peer).map(|entry| entry.count)
    }

    /// Cached wrapper for `peer`, without acquiring it
    pub fn lookup(&self, peer: &P) -> Option<Wrapper<P>> {
        self.cache
            .entries
            .borrow()
            .get(peer)
            .map(|entry| entry.wrapper.clone())
    }

    /// Check if `peer` currently has a wrapper
    pub fn is_cached(&self, peer: &P) -> bool {
        self.cache.entries.borrow().contains_key(peer)
    }

    /// Number of peers with a live wrapper
    pub fn cached_len(&self) -> usize {
        self.cache.entries.borrow().len()
    }
}

impl<P: PeerHandle> Clone for ClassWithPeer<P> {
    fn clone(&self) -> Self {
        Self {
            class: self.class.clone(),
            cache: Rc::clone(&self.cache),
        }
    }
}

impl<P: PeerHandle> fmt::Debug for ClassWithPeer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassWithPeer")
            .field("class", &self.class)
            .field("cached", &self.cached_len())
            .field("options", &self.cache.options)
            .finish()
    }
}

/// Scoped acquisition of a peer wrapper (releases on drop)
///
/// Errors from the release in `drop` cannot be returned; they are logged.
/// Call [`PeerGuard::release`] to observe them.
pub struct PeerGuard<P: PeerHandle> {
    wrapper: Wrapper<P>,
    released: bool,
}

impl<P: PeerHandle> PeerGuard<P> {
    fn new(wrapper: Wrapper<P>) -> Self {
        Self {
            wrapper,
            released: false,
        }
    }

    /// The guarded wrapper
    pub fn wrapper(&self) -> &Wrapper<P> {
        &self.wrapper
    }

    /// Release early and report the outcome
    pub fn release(mut self) -> RuntimeResult<ReleaseOutcome> {
        self.released = true;
        self.wrapper.release()
    }
}

impl<P: PeerHandle> Deref for PeerGuard<P> {
    type Target = Wrapper<P>;

    fn deref(&self) -> &Wrapper<P> {
        &self.wrapper
    }
}

impl<P: PeerHandle> Drop for PeerGuard<P> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.wrapper.release() {
                warn!(error = %e, "scoped peer release failed");
            }
        }
    }
}

impl<P: PeerHandle> fmt::Debug for PeerGuard<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerGuard")
            .field("wrapper", &self.wrapper)
            .field("released", &self.released)
            .finish()
    }
}
