//! Property-based invariant tests for resource resolution.
//!
//! 1. However often and in whatever order keys are resolved, each key is
//!    fetched from the package at most once.
//! 2. Concurrent resolution of the same key fetches once and every caller
//!    sees the same outcome.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use gzui_core::ResourceKey;
use gzui_resource::{MemoryPackage, PackageSource, Resolver};
use proptest::prelude::*;

#[derive(Default)]
struct CountingPackage {
    inner: MemoryPackage,
    fetches: AtomicUsize,
}

impl PackageSource for CountingPackage {
    fn fetch(&self, key: &ResourceKey) -> Option<Arc<[u8]>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(key)
    }

    fn contains(&self, key: &ResourceKey) -> bool {
        self.inner.contains(key)
    }
}

fn package(present: &[u32]) -> Arc<CountingPackage> {
    let mut inner = MemoryPackage::new();
    for instance in present {
        inner.insert(ResourceKey::image(1, *instance), vec![0u8; 4]);
    }
    Arc::new(CountingPackage {
        inner,
        fetches: AtomicUsize::new(0),
    })
}

proptest! {
    #[test]
    fn fetch_at_most_once_per_key(
        present in prop::collection::vec(0u32..8, 0..8),
        lookups in prop::collection::vec((0u32..12, any::<bool>()), 1..64),
    ) {
        let package = package(&present);
        let resolver = Resolver::new(package.clone());
        let mut distinct = BTreeSet::new();
        for (instance, as_image) in lookups {
            let key = ResourceKey::image(1, instance);
            distinct.insert(key);
            if as_image {
                // Four zero bytes are not a bitmap; the failure is cached too.
                prop_assert!(resolver.resolve_image(&key).is_err());
            } else {
                prop_assert_eq!(resolver.resolve_bytes(&key).is_ok(), present.contains(&instance));
            }
        }
        prop_assert_eq!(package.fetches.load(Ordering::SeqCst), distinct.len());
    }
}

#[test]
fn concurrent_resolution_fetches_once() {
    let package = package(&[3]);
    let resolver = Arc::new(Resolver::new(package.clone()));
    let barrier = Arc::new(Barrier::new(16));
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let instance = if i % 2 == 0 { 3 } else { 4 };
                resolver.resolve_bytes(&ResourceKey::image(1, instance)).is_ok()
            })
        })
        .collect();
    let outcomes: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, ok) in outcomes.iter().enumerate() {
        assert_eq!(*ok, i % 2 == 0);
    }
    assert_eq!(package.fetches.load(Ordering::SeqCst), 2);
}
