//! A loaded UI-script document and its asynchronous images.
//!
//! Loading parses the script, builds the element tree synchronously, and
//! queues the tree's image requests on the worker pool. Images arrive later
//! through [`Session::poll_images`]. Every load or reload starts a new
//! generation; results from an older generation are dropped on arrival.
//! A load that fails after its generation has started leaves the previous
//! document in place with its unfinished images marked missing.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gzui_core::font_style::FontStyle;
use gzui_core::{Document, ElementId, ResourceKey, ScriptError};
use gzui_render::ImageBlob;
use gzui_render::icon;
use gzui_resource::{ImageResult, ImageWorkers, PackageSource, Resolver, WorkerError};
use gzui_tree::{BuildOptions, ElementTree, PresentationFlags, Property, build, properties};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::InspectorConfig;

/// Errors that stop a load.
#[derive(Debug)]
pub enum SessionError {
    /// The script key is not in the package.
    NotFound(ResourceKey),
    Script(ScriptError),
    Worker(WorkerError),
    /// `reload` before any `load`.
    NothingLoaded,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "ui script {key} not found"),
            Self::Script(err) => write!(f, "ui script is malformed: {err}"),
            Self::Worker(err) => write!(f, "{err}"),
            Self::NothingLoaded => write!(f, "no document loaded"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Script(err) => Some(err),
            Self::Worker(err) => Some(err),
            Self::NotFound(_) | Self::NothingLoaded => None,
        }
    }
}

impl From<ScriptError> for SessionError {
    fn from(err: ScriptError) -> Self {
        Self::Script(err)
    }
}

impl From<WorkerError> for SessionError {
    fn from(err: WorkerError) -> Self {
        Self::Worker(err)
    }
}

/// Where the current document came from.
#[derive(Debug, Clone)]
enum Origin {
    Package(ResourceKey),
    Source(Arc<str>),
}

#[derive(Debug)]
struct Loaded {
    origin: Origin,
    document: Document,
    tree: ElementTree,
    resolver: Arc<Resolver>,
    generation: u64,
    pending: FxHashSet<ElementId>,
    images: FxHashMap<ElementId, Arc<ImageBlob>>,
}

/// One inspected document at a time, backed by a package.
pub struct Session {
    package: Arc<dyn PackageSource>,
    options: BuildOptions,
    max_depth: usize,
    fonts: BTreeMap<String, FontStyle>,
    workers: ImageWorkers,
    loaded: Option<Loaded>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("workers", &self.workers)
            .field("generation", &self.generation())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start the image workers for `package`.
    pub fn new(package: Arc<dyn PackageSource>, config: &InspectorConfig) -> Result<Self, SessionError> {
        let workers = ImageWorkers::new(config.worker_config())?;
        Ok(Self::with_workers(package, config, workers))
    }

    fn with_workers(package: Arc<dyn PackageSource>, config: &InspectorConfig, workers: ImageWorkers) -> Self {
        Self {
            package,
            options: config.build_options(),
            max_depth: config.max_depth(),
            fonts: BTreeMap::new(),
            workers,
            loaded: None,
        }
    }

    /// Font styles used by [`properties`](Self::properties).
    pub fn set_fonts(&mut self, fonts: BTreeMap<String, FontStyle>) {
        self.fonts = fonts;
    }

    /// Load the UI script stored under `key`.
    pub fn load(&mut self, key: ResourceKey) -> Result<&ElementTree, SessionError> {
        self.open(Origin::Package(key))
    }

    /// Load a UI script from text.
    pub fn load_source(&mut self, source: &str) -> Result<&ElementTree, SessionError> {
        self.open(Origin::Source(Arc::from(source)))
    }

    /// Rebuild the current document from scratch.
    ///
    /// The package is consulted afresh, so resources added or removed since
    /// the last load are picked up. Presentation state is reset.
    pub fn reload(&mut self) -> Result<&ElementTree, SessionError> {
        let origin = self
            .loaded
            .as_ref()
            .map(|loaded| loaded.origin.clone())
            .ok_or(SessionError::NothingLoaded)?;
        self.open(origin)
    }

    fn open(&mut self, origin: Origin) -> Result<&ElementTree, SessionError> {
        let document = match &origin {
            Origin::Package(key) => {
                let bytes = self.package.fetch(key).ok_or(SessionError::NotFound(*key))?;
                Document::parse_with_depth(&String::from_utf8_lossy(&bytes), self.max_depth)?
            }
            Origin::Source(source) => Document::parse_with_depth(source, self.max_depth)?,
        };

        let generation = self.workers.begin_generation();
        let resolver = Arc::new(Resolver::new(Arc::clone(&self.package)));
        let output = build(&document, Some(&resolver), &self.options);

        let mut pending = FxHashSet::default();
        for request in output.requests {
            let element = request.element.clone();
            if let Err(err) = self.workers.submit(generation, &resolver, request) {
                self.abandon_pending();
                return Err(err.into());
            }
            pending.insert(element);
        }
        tracing::debug!(generation, pending = pending.len(), "document loaded");

        let loaded = self.loaded.insert(Loaded {
            origin,
            document,
            tree: output.tree,
            resolver,
            generation,
            pending,
            images: FxHashMap::default(),
        });
        Ok(&loaded.tree)
    }

    #[must_use]
    pub fn tree(&self) -> Option<&ElementTree> {
        self.loaded.as_ref().map(|loaded| &loaded.tree)
    }

    /// For presentation changes: visibility, selection, hover.
    pub fn tree_mut(&mut self) -> Option<&mut ElementTree> {
        self.loaded.as_mut().map(|loaded| &mut loaded.tree)
    }

    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        self.loaded.as_ref().map(|loaded| &loaded.document)
    }

    #[must_use]
    pub fn generation(&self) -> Option<u64> {
        self.loaded.as_ref().map(|loaded| loaded.generation)
    }

    /// Rendered background for an element, once it has arrived.
    #[must_use]
    pub fn image(&self, id: &ElementId) -> Option<&Arc<ImageBlob>> {
        self.loaded.as_ref()?.images.get(id)
    }

    /// Elements still waiting for their image.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.loaded.as_ref().map_or(0, |loaded| loaded.pending.len())
    }

    /// Tree-view thumbnail for an element's image.
    ///
    /// `None` when the element has no image attribute. Unavailable images
    /// give the solid missing-image icon.
    pub fn icon(&self, id: &ElementId) -> Option<ImageBlob> {
        let loaded = self.loaded.as_ref()?;
        let element = loaded.tree.get(id)?;
        let missing = loaded
            .tree
            .flags(id)
            .is_some_and(|flags| flags.contains(PresentationFlags::MISSING_IMAGE));
        if element.paint.image.is_none() && !missing {
            return None;
        }
        let decoded = element
            .paint
            .image
            .and_then(|paint| loaded.resolver.resolve_image(&paint.key).ok());
        let pixels = icon::icon(decoded.as_ref(), element.interface_id.as_deref());
        match ImageBlob::encode(&pixels) {
            Ok(blob) => Some(blob),
            Err(err) => {
                tracing::warn!(element = %id, "{err}");
                None
            }
        }
    }

    /// Property rows for an element's record.
    #[must_use]
    pub fn properties(&self, id: &ElementId) -> Option<Vec<Property>> {
        let loaded = self.loaded.as_ref()?;
        let record = loaded.document.record(id)?;
        Some(properties(record, &self.fonts, |key| loaded.resolver.contains(key)))
    }

    /// Apply every finished image without blocking.
    ///
    /// Returns how many results belonged to the current document.
    pub fn poll_images(&mut self) -> usize {
        let results = self.workers.drain();
        results.into_iter().filter(|result| self.apply(result)).count()
    }

    /// Block until no images are pending or `timeout` elapses.
    ///
    /// Returns `true` when nothing is pending.
    pub fn wait_for_images(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pending() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if let Some(result) = self.workers.recv_timeout(remaining) {
                self.apply(&result);
            }
        }
        true
    }

    /// Jobs of the current document are skipped once a newer generation has
    /// started, so whatever has not finished yet will never arrive.
    fn abandon_pending(&mut self) {
        self.poll_images();
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        for element in loaded.pending.drain() {
            tracing::warn!(element = %element, "image abandoned");
            loaded.tree.mark_missing(&element);
        }
    }

    fn apply(&mut self, result: &ImageResult) -> bool {
        let Some(loaded) = self.loaded.as_mut() else {
            return false;
        };
        if result.generation != loaded.generation {
            tracing::trace!(
                element = %result.element,
                generation = result.generation,
                current = loaded.generation,
                "dropping stale image"
            );
            return false;
        }
        if !loaded.pending.remove(&result.element) {
            return false;
        }
        match &result.blob {
            Some(blob) => {
                loaded.images.insert(result.element.clone(), Arc::clone(blob));
            }
            None => {
                tracing::warn!(element = %result.element, key = %result.key, "image unavailable");
                loaded.tree.mark_missing(&result.element);
            }
        }
        true
    }
}
