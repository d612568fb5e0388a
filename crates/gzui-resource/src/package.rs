//! The package collaborator.

use std::sync::Arc;

use gzui_core::ResourceKey;
use rustc_hash::FxHashMap;

/// Fetches raw resource bytes by key.
///
/// Implementations index the package archive; decompression, if any,
/// happens behind `fetch`.
pub trait PackageSource: Send + Sync {
    /// Raw bytes for `key`, or `None` when the package has no such entry.
    fn fetch(&self, key: &ResourceKey) -> Option<Arc<[u8]>>;

    /// Whether `key` exists, without extracting it.
    fn contains(&self, key: &ResourceKey) -> bool;
}

impl<T: PackageSource + ?Sized> PackageSource for Arc<T> {
    fn fetch(&self, key: &ResourceKey) -> Option<Arc<[u8]>> {
        (**self).fetch(key)
    }

    fn contains(&self, key: &ResourceKey) -> bool {
        (**self).contains(key)
    }
}

/// An in-memory package.
#[derive(Debug, Clone, Default)]
pub struct MemoryPackage {
    entries: FxHashMap<ResourceKey, Arc<[u8]>>,
}

impl MemoryPackage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ResourceKey, bytes: impl Into<Arc<[u8]>>) {
        self.entries.insert(key, bytes.into());
    }

    #[must_use]
    pub fn with(mut self, key: ResourceKey, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(key, bytes);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in ascending order.
    #[must_use]
    pub fn keys(&self) -> Vec<ResourceKey> {
        let mut keys: Vec<_> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

impl PackageSource for MemoryPackage {
    fn fetch(&self, key: &ResourceKey) -> Option<Arc<[u8]>> {
        self.entries.get(key).cloned()
    }

    fn contains(&self, key: &ResourceKey) -> bool {
        self.entries.contains_key(key)
    }
}
