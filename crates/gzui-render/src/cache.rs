//! LRU cache of encoded composites.
//!
//! Many elements share a bitmap at the same size (list rows, buttons), so
//! composites are keyed by everything that affects their pixels.

use std::hash::BuildHasherDefault;
use std::num::NonZeroUsize;
use std::sync::Arc;

use gzui_core::{BlitMode, ResourceKey};
use lru::LruCache;
use rustc_hash::FxHasher;

use crate::encode::ImageBlob;
use crate::image::ImageError;
use crate::slice::SliceTable;

/// Default cache capacity.
pub const DEFAULT_COMPOSITE_CAPACITY: usize = 256;

/// Everything that determines a composite's pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    pub key: ResourceKey,
    pub blit: BlitMode,
    pub width: u32,
    pub height: u32,
    pub slices: Option<SliceTable>,
}

/// Statistics about cache performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub capacity: usize,
}

/// LRU of composites.
///
/// Not thread-safe; the worker pool wraps it in a mutex.
#[derive(Debug)]
pub struct CompositeCache {
    cache: LruCache<CompositeKey, Arc<ImageBlob>, BuildHasherDefault<FxHasher>>,
    hits: u64,
    misses: u64,
}

impl CompositeCache {
    /// Create a cache holding `capacity` composites (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::with_hasher(capacity, BuildHasherDefault::default()),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached composite or build, store, and return it.
    ///
    /// Failures are not cached.
    pub fn get_or_try_insert<F>(
        &mut self,
        key: CompositeKey,
        build: F,
    ) -> Result<Arc<ImageBlob>, ImageError>
    where
        F: FnOnce() -> Result<ImageBlob, ImageError>,
    {
        if let Some(blob) = self.cache.get(&key) {
            self.hits += 1;
            return Ok(Arc::clone(blob));
        }
        self.misses += 1;
        let blob = Arc::new(build()?);
        self.cache.put(key, Arc::clone(&blob));
        Ok(blob)
    }

    /// Look up a composite, counting the hit or miss.
    pub fn get(&mut self, key: &CompositeKey) -> Option<Arc<ImageBlob>> {
        let found = self.cache.get(key).cloned();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    pub fn insert(&mut self, key: CompositeKey, blob: Arc<ImageBlob>) {
        self.cache.put(key, blob);
    }

    #[must_use]
    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.cache.contains(key)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.cache.len(),
            capacity: self.cache.cap().get(),
        }
    }
}

impl Default for CompositeCache {
    fn default() -> Self {
        Self::new(DEFAULT_COMPOSITE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn key(width: u32) -> CompositeKey {
        CompositeKey {
            key: ResourceKey::image(1, 2),
            blit: BlitMode::Edge,
            width,
            height: 4,
            slices: None,
        }
    }

    fn blob(width: u32) -> Result<ImageBlob, ImageError> {
        ImageBlob::encode(&RgbaImage::from_pixel(width, 4, Rgba([0, 0, 0, 255])))
    }

    #[test]
    fn hit_after_miss() {
        let mut cache = CompositeCache::new(4);
        let a = cache.get_or_try_insert(key(2), || blob(2)).unwrap();
        let b = cache
            .get_or_try_insert(key(2), || panic!("should be cached"))
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
    }

    #[test]
    fn evicts_least_recent() {
        let mut cache = CompositeCache::new(2);
        for w in 1..=3 {
            cache.get_or_try_insert(key(w), || blob(w)).unwrap();
        }
        assert!(!cache.contains(&key(1)));
        assert!(cache.contains(&key(3)));
    }

    #[test]
    fn failures_not_cached() {
        let mut cache = CompositeCache::new(2);
        let err = cache.get_or_try_insert(key(1), || {
            Err(ImageError::Encode(image::ImageError::Limits(
                image::error::LimitError::from_kind(image::error::LimitErrorKind::DimensionError),
            )))
        });
        assert!(err.is_err());
        assert!(!cache.contains(&key(1)));
    }

    #[test]
    fn split_get_insert() {
        let mut cache = CompositeCache::new(2);
        assert!(cache.get(&key(1)).is_none());
        cache.insert(key(1), Arc::new(blob(1).unwrap()));
        assert!(cache.get(&key(1)).is_some());
        assert_eq!((cache.stats().hits, cache.stats().misses), (1, 1));
    }

    #[test]
    fn zero_capacity_holds_one() {
        assert_eq!(CompositeCache::new(0).stats().capacity, 1);
    }
}
