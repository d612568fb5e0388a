//! Cached resource resolution.
//!
//! Both successes and failures are cached: a key that was not found, or
//! whose bytes did not decode, is not retried within the same document.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use gzui_core::ResourceKey;
use gzui_render::{DecodedImage, ImageError};

use crate::cache::{FlightStats, SingleFlight};
use crate::package::PackageSource;

/// Why a resource is unavailable. Both cases mean "no image" downstream.
#[derive(Debug, Clone)]
pub enum ResolveError {
    NotFound(ResourceKey),
    Decode(ResourceKey, Arc<ImageError>),
}

impl ResolveError {
    #[must_use]
    pub fn key(&self) -> ResourceKey {
        match self {
            Self::NotFound(key) | Self::Decode(key, _) => *key,
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "resource {key} not found"),
            Self::Decode(key, err) => write!(f, "resource {key}: {err}"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Decode(_, err) => Some(err.as_ref()),
        }
    }
}

/// Resolver counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolverStats {
    /// Calls into [`PackageSource::fetch`].
    pub fetches: u64,
    pub bytes: FlightStats,
    pub images: FlightStats,
}

/// Per-document resolver over a package.
pub struct Resolver {
    package: Arc<dyn PackageSource>,
    bytes: SingleFlight<ResourceKey, Result<Arc<[u8]>, ResolveError>>,
    images: SingleFlight<ResourceKey, Result<DecodedImage, ResolveError>>,
    fetches: AtomicU64,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl Resolver {
    #[must_use]
    pub fn new(package: Arc<dyn PackageSource>) -> Self {
        Self {
            package,
            bytes: SingleFlight::new(),
            images: SingleFlight::new(),
            fetches: AtomicU64::new(0),
        }
    }

    /// Whether the package holds `key`. Answers from the cache when the
    /// key was already resolved.
    #[must_use]
    pub fn contains(&self, key: &ResourceKey) -> bool {
        match self.bytes.peek(key) {
            Some(result) => result.is_ok(),
            None => self.package.contains(key),
        }
    }

    /// Raw bytes for `key`, fetched at most once.
    pub fn resolve_bytes(&self, key: &ResourceKey) -> Result<Arc<[u8]>, ResolveError> {
        self.bytes.get_or_insert_with(key, || {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            self.package.fetch(key).ok_or_else(|| {
                tracing::warn!(key = %key, "resource not found");
                ResolveError::NotFound(*key)
            })
        })
    }

    /// Decoded bitmap for `key`, decoded at most once.
    pub fn resolve_image(&self, key: &ResourceKey) -> Result<DecodedImage, ResolveError> {
        self.images.get_or_insert_with(key, || {
            let _span = tracing::debug_span!("decode_image", key = %key).entered();
            let bytes = self.resolve_bytes(key)?;
            DecodedImage::decode(&bytes).map_err(|err| {
                tracing::warn!(key = %key, error = %err, "resource is not a bitmap");
                ResolveError::Decode(*key, Arc::new(err))
            })
        })
    }

    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            fetches: self.fetches.load(Ordering::Relaxed),
            bytes: self.bytes.stats(),
            images: self.images.stats(),
        }
    }
}
