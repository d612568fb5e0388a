//! Background image rendering.
//!
//! Each request is resolved, composited to the element's size, and encoded
//! as PNG on a worker thread; the result is sent back tagged with the
//! document generation it was submitted for. Jobs whose generation is no
//! longer current when a worker picks them up are skipped, and the owner
//! drops stale results on receipt. Nothing is cancelled mid-flight.
//!
//! A request that panics, or asks for a surface larger than the configured
//! maximum, still produces a result with no blob, so its element can be
//! marked missing.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use gzui_core::{BlitMode, ElementId, ResourceKey};
use gzui_render::cache::CacheStats;
use gzui_render::composite::{DEFAULT_MAX_SURFACE, fits_surface};
use gzui_render::{
    CompositeCache, CompositeKey, HalfImage, ImageBlob, SliceRule, composite,
    cache::DEFAULT_COMPOSITE_CAPACITY,
};

use crate::resolver::Resolver;

/// Pool settings.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Worker threads; at least one is always started.
    pub workers: usize,
    /// Composite LRU capacity.
    pub composite_cache: usize,
    /// Slice table derivation for edge-blitted images.
    pub slice_rule: Arc<dyn SliceRule>,
    /// Largest composite rendered, in pixels.
    pub max_surface: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            composite_cache: DEFAULT_COMPOSITE_CAPACITY,
            slice_rule: Arc::new(HalfImage),
            max_surface: DEFAULT_MAX_SURFACE,
        }
    }
}

/// One image-bearing element waiting for its pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub element: ElementId,
    pub key: ResourceKey,
    pub blit: BlitMode,
    pub width: u32,
    pub height: u32,
    /// Numeric `wparam` value, used by parameterised slice rules.
    pub param: Option<i64>,
}

/// The outcome of one request. `blob` is `None` when the image is missing
/// or undecodable.
#[derive(Debug, Clone)]
pub struct ImageResult {
    pub generation: u64,
    pub element: ElementId,
    pub key: ResourceKey,
    pub blob: Option<Arc<ImageBlob>>,
}

#[derive(Debug)]
pub enum WorkerError {
    /// All workers have exited.
    QueueClosed,
    Spawn(std::io::Error),
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueClosed => write!(f, "image queue closed"),
            Self::Spawn(err) => write!(f, "failed to start image worker: {err}"),
        }
    }
}

impl std::error::Error for WorkerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::QueueClosed => None,
            Self::Spawn(err) => Some(err),
        }
    }
}

struct Job {
    generation: u64,
    resolver: Arc<Resolver>,
    request: ImageRequest,
}

/// Everything a render needs besides the resolver.
pub struct RenderContext {
    pub cache: Mutex<CompositeCache>,
    pub slice_rule: Arc<dyn SliceRule>,
    pub max_surface: u64,
}

impl RenderContext {
    #[must_use]
    pub fn new(config: &WorkerConfig) -> Self {
        Self {
            cache: Mutex::new(CompositeCache::new(config.composite_cache)),
            slice_rule: Arc::clone(&config.slice_rule),
            max_surface: config.max_surface,
        }
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("slice_rule", &self.slice_rule)
            .field("max_surface", &self.max_surface)
            .finish_non_exhaustive()
    }
}

struct Shared {
    generation: AtomicU64,
    render: RenderContext,
}

/// Fixed pool of image worker threads.
pub struct ImageWorkers {
    sender: Option<mpsc::Sender<Job>>,
    results: mpsc::Receiver<ImageResult>,
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl fmt::Debug for ImageWorkers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageWorkers")
            .field("workers", &self.workers.len())
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

impl ImageWorkers {
    /// Start the pool.
    pub fn new(config: WorkerConfig) -> Result<Self, WorkerError> {
        let (sender, jobs) = mpsc::channel::<Job>();
        let (result_sender, results) = mpsc::channel();
        let jobs = Arc::new(Mutex::new(jobs));
        let shared = Arc::new(Shared {
            generation: AtomicU64::new(0),
            render: RenderContext::new(&config),
        });

        let mut workers = Vec::with_capacity(config.workers.max(1));
        for index in 0..config.workers.max(1) {
            let jobs = Arc::clone(&jobs);
            let shared = Arc::clone(&shared);
            let results = result_sender.clone();
            let handle = thread::Builder::new()
                .name(format!("gzui-image-{index}"))
                .spawn(move || worker_loop(&jobs, &shared, &results))
                .map_err(WorkerError::Spawn)?;
            workers.push(handle);
        }
        tracing::debug!(workers = workers.len(), "image workers started");

        Ok(Self {
            sender: Some(sender),
            results,
            shared,
            workers,
        })
    }

    /// The generation jobs are currently accepted for.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }

    /// Supersede every queued job and clear the composite cache.
    ///
    /// Returns the new generation.
    pub fn begin_generation(&self) -> u64 {
        self.shared
            .render
            .cache
            .lock()
            .expect("composite cache lock poisoned")
            .clear();
        self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Queue a request for `generation`, resolved through `resolver`.
    pub fn submit(
        &self,
        generation: u64,
        resolver: &Arc<Resolver>,
        request: ImageRequest,
    ) -> Result<(), WorkerError> {
        let sender = self.sender.as_ref().ok_or(WorkerError::QueueClosed)?;
        sender
            .send(Job {
                generation,
                resolver: Arc::clone(resolver),
                request,
            })
            .map_err(|_| WorkerError::QueueClosed)
    }

    /// Stop accepting jobs. Queued jobs still run.
    pub fn close(&mut self) {
        self.sender.take();
    }

    /// A finished result, if any.
    #[must_use]
    pub fn try_recv(&self) -> Option<ImageResult> {
        self.results.try_recv().ok()
    }

    /// Wait up to `timeout` for a result.
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ImageResult> {
        self.results.recv_timeout(timeout).ok()
    }

    /// Every result finished so far.
    #[must_use]
    pub fn drain(&self) -> Vec<ImageResult> {
        self.results.try_iter().collect()
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.shared
            .render
            .cache
            .lock()
            .expect("composite cache lock poisoned")
            .stats()
    }
}

impl Drop for ImageWorkers {
    fn drop(&mut self) {
        self.sender.take();
        for handle in self.workers.drain(..) {
            if let Err(payload) = handle.join() {
                tracing::warn!(panic = panic_message(&*payload), "image worker panicked");
            }
        }
    }
}

fn worker_loop(
    jobs: &Mutex<mpsc::Receiver<Job>>,
    shared: &Shared,
    results: &mpsc::Sender<ImageResult>,
) {
    loop {
        let next = jobs.lock().expect("image job queue lock poisoned").recv();
        let Ok(job) = next else {
            break;
        };
        let _span = tracing::debug_span!("resolve_image", key = %job.request.key).entered();
        if job.generation != shared.generation.load(Ordering::Acquire) {
            tracing::trace!(element = %job.request.element, "skipping superseded image job");
            continue;
        }
        let request = &job.request;
        let blob = panic::catch_unwind(AssertUnwindSafe(|| {
            render_request(&job.resolver, &shared.render, request)
        }))
        .unwrap_or_else(|payload| {
            tracing::warn!(
                element = %request.element,
                panic = panic_message(&*payload),
                "image render panicked"
            );
            None
        });
        let result = ImageResult {
            generation: job.generation,
            element: job.request.element,
            key: job.request.key,
            blob,
        };
        if results.send(result).is_err() {
            break;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Resolve, composite, and encode one request on the calling thread.
///
/// Composites are looked up in, and added to, the context's cache. Returns
/// `None` when the element has no area, its area exceeds the context's
/// maximum surface, or the image is unavailable.
pub fn render_request(
    resolver: &Resolver,
    context: &RenderContext,
    request: &ImageRequest,
) -> Option<Arc<ImageBlob>> {
    if request.width == 0 || request.height == 0 {
        return None;
    }
    if !fits_surface(request.width, request.height, context.max_surface) {
        tracing::warn!(
            element = %request.element,
            width = request.width,
            height = request.height,
            max = context.max_surface,
            "image area too large"
        );
        return None;
    }
    let cache = &context.cache;
    let image = match resolver.resolve_image(&request.key) {
        Ok(image) => image,
        Err(err) => {
            tracing::debug!(element = %request.element, error = %err, "image unavailable");
            return None;
        }
    };

    let slices = (request.blit == BlitMode::Edge)
        .then(|| context.slice_rule.table(image.width(), image.height(), request.param));
    let key = CompositeKey {
        key: request.key,
        blit: request.blit,
        width: request.width,
        height: request.height,
        slices,
    };
    if let Some(blob) = cache.lock().expect("composite cache lock poisoned").get(&key) {
        return Some(blob);
    }

    let image = match slices {
        Some(table) => image.with_slices(table),
        None => image,
    };
    let pixels = composite(&image, request.width, request.height, request.blit);
    match ImageBlob::encode(&pixels) {
        Ok(blob) => {
            let blob = Arc::new(blob);
            cache
                .lock()
                .expect("composite cache lock poisoned")
                .insert(key, Arc::clone(&blob));
            Some(blob)
        }
        Err(err) => {
            tracing::warn!(key = %request.key, error = %err, "failed to encode composite");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::MemoryPackage;
    use gzui_render::{DecodedImage, FixedBands, SliceTable};
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    const WAIT: Duration = Duration::from_secs(5);

    fn png(w: u32, h: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbaImage::from_pixel(w, h, Rgba([200, 0, 0, 255]))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn resolver() -> Arc<Resolver> {
        let package = MemoryPackage::new().with(ResourceKey::image(1, 1), png(8, 8));
        Arc::new(Resolver::new(Arc::new(package)))
    }

    fn request(element: &str, key: ResourceKey, blit: BlitMode) -> ImageRequest {
        ImageRequest {
            element: ElementId::from(element),
            key,
            blit,
            width: 20,
            height: 10,
            param: None,
        }
    }

    fn context(rule: Arc<dyn SliceRule>) -> RenderContext {
        RenderContext::new(&WorkerConfig {
            composite_cache: 4,
            slice_rule: rule,
            ..WorkerConfig::default()
        })
    }

    /// Panics whenever an edge table is requested.
    #[derive(Debug)]
    struct Exploding;

    impl SliceRule for Exploding {
        fn table(&self, _: u32, _: u32, _: Option<i64>) -> SliceTable {
            panic!("no table for this image")
        }
    }

    #[test]
    fn renders_at_target_size() {
        let req = request("e0", ResourceKey::image(1, 1), BlitMode::Edge);
        let blob = render_request(&resolver(), &context(Arc::new(HalfImage)), &req).unwrap();
        assert_eq!((blob.width, blob.height), (20, 10));
        let decoded = DecodedImage::decode(&blob.png).unwrap();
        assert_eq!(decoded.pixels().get_pixel(10, 5), &Rgba([200, 0, 0, 255]));
    }

    #[test]
    fn composites_are_shared() {
        let context = context(Arc::new(HalfImage));
        let resolver = resolver();
        let a = render_request(&resolver, &context, &request("e0", ResourceKey::image(1, 1), BlitMode::Tile)).unwrap();
        let b = render_request(&resolver, &context, &request("e1", ResourceKey::image(1, 1), BlitMode::Tile)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn slice_rule_changes_cache_key() {
        let mut context = context(Arc::new(HalfImage));
        let resolver = resolver();
        let req = request("e0", ResourceKey::image(1, 1), BlitMode::Edge);
        render_request(&resolver, &context, &req).unwrap();
        context.slice_rule = Arc::new(FixedBands::DIALOG);
        render_request(&resolver, &context, &req).unwrap();
        assert_eq!(context.cache.lock().unwrap().stats().size, 2);
    }

    #[test]
    fn missing_and_empty_give_none() {
        let context = context(Arc::new(HalfImage));
        let resolver = resolver();
        assert!(render_request(&resolver, &context, &request("e0", ResourceKey::image(5, 5), BlitMode::Normal)).is_none());
        let mut empty = request("e1", ResourceKey::image(1, 1), BlitMode::Normal);
        empty.width = 0;
        assert!(render_request(&resolver, &context, &empty).is_none());
    }

    #[test]
    fn oversized_areas_give_none() {
        let context = context(Arc::new(HalfImage));
        let resolver = resolver();
        for mode in [BlitMode::Normal, BlitMode::Tile, BlitMode::Edge] {
            let mut huge = request("e0", ResourceKey::image(1, 1), mode);
            huge.width = u32::MAX;
            huge.height = u32::MAX;
            assert!(render_request(&resolver, &context, &huge).is_none());
        }

        let small = RenderContext {
            max_surface: 199,
            ..self::context(Arc::new(HalfImage))
        };
        let req = request("e1", ResourceKey::image(1, 1), BlitMode::Normal);
        assert!(render_request(&resolver, &small, &req).is_none());
        let fits = RenderContext {
            max_surface: 200,
            ..self::context(Arc::new(HalfImage))
        };
        assert!(render_request(&resolver, &fits, &req).is_some());
    }

    #[test]
    fn pool_round_trip() {
        let workers = ImageWorkers::new(WorkerConfig::default()).unwrap();
        let generation = workers.begin_generation();
        let resolver = resolver();
        workers
            .submit(generation, &resolver, request("e0", ResourceKey::image(1, 1), BlitMode::Normal))
            .unwrap();
        workers
            .submit(generation, &resolver, request("e1", ResourceKey::image(2, 2), BlitMode::Normal))
            .unwrap();

        let mut results: Vec<_> = (0..2).filter_map(|_| workers.recv_timeout(WAIT)).collect();
        results.sort_by(|a, b| a.element.cmp(&b.element));
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.generation == generation));
        assert!(results[0].blob.is_some());
        assert!(results[1].blob.is_none());
    }

    #[test]
    fn superseded_jobs_are_skipped() {
        let workers = ImageWorkers::new(WorkerConfig {
            workers: 1,
            ..WorkerConfig::default()
        })
        .unwrap();
        let old = workers.begin_generation();
        let current = workers.begin_generation();
        let resolver = resolver();
        workers
            .submit(old, &resolver, request("e0", ResourceKey::image(1, 1), BlitMode::Normal))
            .unwrap();
        workers
            .submit(current, &resolver, request("e1", ResourceKey::image(1, 1), BlitMode::Normal))
            .unwrap();
        let result = workers.recv_timeout(WAIT).unwrap();
        assert_eq!(result.generation, current);
        assert_eq!(result.element.as_str(), "e1");
        assert!(workers.try_recv().is_none());
    }

    #[test]
    fn panicking_render_reports_missing_and_worker_survives() {
        let workers = ImageWorkers::new(WorkerConfig {
            workers: 1,
            slice_rule: Arc::new(Exploding),
            ..WorkerConfig::default()
        })
        .unwrap();
        let generation = workers.begin_generation();
        let resolver = resolver();
        workers
            .submit(generation, &resolver, request("e0", ResourceKey::image(1, 1), BlitMode::Edge))
            .unwrap();
        let failed = workers.recv_timeout(WAIT).unwrap();
        assert_eq!(failed.element.as_str(), "e0");
        assert!(failed.blob.is_none());

        workers
            .submit(generation, &resolver, request("e1", ResourceKey::image(1, 1), BlitMode::Normal))
            .unwrap();
        let next = workers.recv_timeout(WAIT).unwrap();
        assert_eq!(next.element.as_str(), "e1");
        assert!(next.blob.is_some());
    }

    #[test]
    fn closed_pool_rejects_jobs() {
        let mut workers = ImageWorkers::new(WorkerConfig::default()).unwrap();
        let generation = workers.begin_generation();
        workers.close();
        let err = workers
            .submit(generation, &resolver(), request("e0", ResourceKey::image(1, 1), BlitMode::Normal))
            .unwrap_err();
        assert!(matches!(err, WorkerError::QueueClosed));
    }
}
