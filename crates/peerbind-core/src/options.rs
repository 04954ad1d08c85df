//! Peer cache configuration

use crate::error::RuntimeError;
use std::fmt;
use std::str::FromStr;

/// Environment variable read by [`PeerCacheOptions::from_env`]
pub const STALE_RELEASE_ENV: &str = "PEERBIND_STALE_RELEASE";

/// What a release does when the peer has no matching cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleReleasePolicy {
    /// Silent no-op
    Ignore,
    /// No-op plus a `tracing` warning
    #[default]
    Warn,
    /// Report [`RuntimeError::StaleRelease`]
    Error,
}

impl FromStr for StaleReleasePolicy {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(StaleReleasePolicy::Ignore),
            "warn" => Ok(StaleReleasePolicy::Warn),
            "error" => Ok(StaleReleasePolicy::Error),
            other => Err(RuntimeError::InvalidOption(format!(
                "unknown stale release policy '{}' (expected ignore, warn or error)",
                other
            ))),
        }
    }
}

impl fmt::Display for StaleReleasePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StaleReleasePolicy::Ignore => "ignore",
            StaleReleasePolicy::Warn => "warn",
            StaleReleasePolicy::Error => "error",
        };
        f.write_str(name)
    }
}

/// Options for a [`ClassWithPeer`](crate::ClassWithPeer) cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerCacheOptions {
    /// Handling of releases with no matching entry
    pub stale_release: StaleReleasePolicy,

    /// Number of entries the cache reserves up front
    pub initial_capacity: usize,
}

impl PeerCacheOptions {
    /// Defaults, with the stale release policy taken from
    /// `PEERBIND_STALE_RELEASE` when it is set
    pub fn from_env() -> Result<Self, RuntimeError> {
        let mut options = Self::default();
        if let Ok(raw) = std::env::var(STALE_RELEASE_ENV) {
            options.stale_release = raw.parse()?;
        }
        Ok(options)
    }

    /// Same options with a different stale release policy
    pub fn with_stale_release(mut self, policy: StaleReleasePolicy) -> Self {
        self.stale_release = policy;
        self
    }
}

impl Default for PeerCacheOptions {
    fn default() -> Self {
        Self {
            stale_release: StaleReleasePolicy::default(),
            initial_capacity: 16,
        }
    }
}
