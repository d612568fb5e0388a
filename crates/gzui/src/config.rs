//! Inspector configuration from environment variables.
//!
//! Environment variables:
//! - `GZUI_SLICE_RULE` = half|param|dialog|fixed:l,t,r,b
//! - `GZUI_IMAGE_WORKERS` (usize, ≥ 1)
//! - `GZUI_COMPOSITE_CACHE` (usize, ≥ 1)
//! - `GZUI_CAPTION_TYPES` (comma-separated interface tags)
//! - `GZUI_BACKGROUND_TYPES` (comma-separated interface tags)
//! - `GZUI_MAX_DEPTH` (usize, ≥ 1)
//! - `GZUI_MAX_SURFACE` (largest composite in pixels, u64, ≥ 1)
//!
//! Unparseable or out-of-range values keep the default and are reported,
//! never fatal.

use std::env;
use std::fmt;
use std::sync::Arc;

use gzui_core::script::DEFAULT_MAX_DEPTH;
use gzui_layout::CaptionPolicy;
use gzui_layout::caption::DEFAULT_CAPTION_TYPES;
use gzui_render::cache::DEFAULT_COMPOSITE_CAPACITY;
use gzui_render::composite::DEFAULT_MAX_SURFACE;
use gzui_render::{FixedBands, HalfImage, ParamBands, SliceRule, SliceTable};
use gzui_resource::WorkerConfig;
use gzui_tree::{BuildOptions, DEFAULT_BACKGROUND_TYPES};

pub const ENV_SLICE_RULE: &str = "GZUI_SLICE_RULE";
pub const ENV_IMAGE_WORKERS: &str = "GZUI_IMAGE_WORKERS";
pub const ENV_COMPOSITE_CACHE: &str = "GZUI_COMPOSITE_CACHE";
pub const ENV_CAPTION_TYPES: &str = "GZUI_CAPTION_TYPES";
pub const ENV_BACKGROUND_TYPES: &str = "GZUI_BACKGROUND_TYPES";
pub const ENV_MAX_DEPTH: &str = "GZUI_MAX_DEPTH";
pub const ENV_MAX_SURFACE: &str = "GZUI_MAX_SURFACE";

/// How edge-blitted images are sliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliceRuleChoice {
    /// Bands are half the source image.
    #[default]
    Half,
    /// `wparam` value as a uniform band, else half.
    Param,
    /// The 30/30/30/62 question-dialog table.
    Dialog,
    Fixed(SliceTable),
}

impl SliceRuleChoice {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "half" => Some(Self::Half),
            "param" => Some(Self::Param),
            "dialog" => Some(Self::Dialog),
            _ => {
                let bands = value.strip_prefix("fixed:")?;
                let parts: Vec<u32> = bands
                    .split(',')
                    .map(|part| part.trim().parse().ok())
                    .collect::<Option<_>>()?;
                match parts.as_slice() {
                    &[left, top, right, bottom] => {
                        Some(Self::Fixed(SliceTable::new(left, top, right, bottom)))
                    }
                    _ => None,
                }
            }
        }
    }

    #[must_use]
    pub fn to_rule(self) -> Arc<dyn SliceRule> {
        match self {
            Self::Half => Arc::new(HalfImage),
            Self::Param => Arc::new(ParamBands),
            Self::Dialog => Arc::new(FixedBands::DIALOG),
            Self::Fixed(table) => Arc::new(FixedBands(table)),
        }
    }
}

impl fmt::Display for SliceRuleChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Half => f.write_str("half"),
            Self::Param => f.write_str("param"),
            Self::Dialog => f.write_str("dialog"),
            Self::Fixed(table) => write!(f, "fixed:{table}"),
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorConfig {
    pub slice_rule: SliceRuleChoice,
    pub image_workers: usize,
    pub composite_cache: usize,
    pub caption_types: Vec<String>,
    pub background_types: Vec<String>,
    pub max_depth: usize,
    pub max_surface: u64,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            slice_rule: SliceRuleChoice::Half,
            image_workers: 2,
            composite_cache: DEFAULT_COMPOSITE_CAPACITY,
            caption_types: tags(DEFAULT_CAPTION_TYPES),
            background_types: tags(DEFAULT_BACKGROUND_TYPES),
            max_depth: DEFAULT_MAX_DEPTH,
            max_surface: DEFAULT_MAX_SURFACE,
        }
    }
}

/// Parsed configuration plus every problem found on the way.
#[derive(Debug, Clone)]
pub struct ConfigParse {
    pub config: InspectorConfig,
    pub errors: Vec<ConfigError>,
}

/// One rejected setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl InspectorConfig {
    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> ConfigParse {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Parse config from any variable source.
    pub fn from_env_with<F>(mut get: F) -> ConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut errors = Vec::new();

        if let Some(value) = get(ENV_SLICE_RULE) {
            match SliceRuleChoice::parse(&value) {
                Some(parsed) => config.slice_rule = parsed,
                None => errors.push(ConfigError::new(
                    "slice_rule",
                    value,
                    "expected half|param|dialog|fixed:l,t,r,b",
                )),
            }
        }

        if let Some(value) = get(ENV_IMAGE_WORKERS) {
            match parse_positive(&value) {
                Some(parsed) => config.image_workers = parsed,
                None => errors.push(ConfigError::new("image_workers", value, "expected usize >= 1")),
            }
        }

        if let Some(value) = get(ENV_COMPOSITE_CACHE) {
            match parse_positive(&value) {
                Some(parsed) => config.composite_cache = parsed,
                None => errors.push(ConfigError::new("composite_cache", value, "expected usize >= 1")),
            }
        }

        if let Some(value) = get(ENV_CAPTION_TYPES) {
            config.caption_types = parse_list(&value);
        }

        if let Some(value) = get(ENV_BACKGROUND_TYPES) {
            config.background_types = parse_list(&value);
        }

        if let Some(value) = get(ENV_MAX_DEPTH) {
            match parse_positive(&value) {
                Some(parsed) => config.max_depth = parsed,
                None => errors.push(ConfigError::new("max_depth", value, "expected usize >= 1")),
            }
        }

        if let Some(value) = get(ENV_MAX_SURFACE) {
            match value.trim().parse::<u64>() {
                Ok(parsed) if parsed > 0 => config.max_surface = parsed,
                _ => errors.push(ConfigError::new("max_surface", value, "expected u64 >= 1")),
            }
        }

        if let Err(mut validation) = config.validate() {
            errors.append(&mut validation);
        }

        ConfigParse { config, errors }
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        validate_positive("image_workers", self.image_workers, &mut errors);
        validate_positive("composite_cache", self.composite_cache, &mut errors);
        validate_positive("max_depth", self.max_depth, &mut errors);
        if self.max_surface == 0 {
            errors.push(ConfigError::new("max_surface", "0", "must be >= 1"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Script nesting limit, never below one.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth.max(1)
    }

    #[must_use]
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            captions: CaptionPolicy::with_types(self.caption_types.iter().cloned()),
            background_types: self.background_types.clone(),
        }
    }

    #[must_use]
    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            workers: self.image_workers.max(1),
            composite_cache: self.composite_cache.max(1),
            slice_rule: self.slice_rule.to_rule(),
            max_surface: self.max_surface.max(1),
        }
    }
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|tag| (*tag).to_string()).collect()
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Zero is rejected so a bad variable keeps the default.
#[inline]
fn parse_positive(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|&parsed| parsed > 0)
}

fn validate_positive(field: &'static str, value: usize, errors: &mut Vec<ConfigError>) {
    if value == 0 {
        errors.push(ConfigError::new(field, "0", "must be >= 1"));
    }
}
