#![forbid(unsafe_code)]

//! Resource resolution for one document session.
//!
//! - [`PackageSource`] - the byte-fetch collaborator (`key -> bytes`)
//! - [`SingleFlight`] - per-key cache where concurrent callers share one
//!   in-flight computation
//! - [`Resolver`] - cached bytes and decoded bitmaps, `NotFound` and
//!   decode failures included
//! - [`ImageWorkers`] - background resolve → composite → encode, tagged
//!   with the document generation so superseded results can be dropped
//!
//! A resolver lives exactly as long as the document it serves; reloads
//! build a new one.

pub mod cache;
pub mod jobs;
pub mod package;
pub mod resolver;

pub use cache::SingleFlight;
pub use jobs::{ImageRequest, ImageResult, ImageWorkers, RenderContext, WorkerConfig, WorkerError};
pub use package::{MemoryPackage, PackageSource};
pub use resolver::{ResolveError, Resolver, ResolverStats};
