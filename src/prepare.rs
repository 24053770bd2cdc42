//! Photo preparation: the stage that runs before any page is composed.
//!
//! Takes the 13 discovered source photos and, for each one, writes two
//! print-ready JPEGs and extracts a palette:
//!
//! - **normal**: cropped to fill the configured pixel size
//! - **mirrored**: the same crop, flipped vertically, for the mirrored
//!   document
//! - **palette**: dominant colors of the source, sized for the page the
//!   photo appears on (title or month)
//!
//! ## Output Structure
//!
//! ```text
//! <temp-dir>/prepared/
//! ├── manifest.json            # PreparedSet: paths + palettes per slot
//! ├── .cache-manifest.json     # Content-addressed cache (see cache module)
//! ├── 00-normal.jpg
//! ├── 00-mirrored.jpg
//! ├── 01-normal.jpg
//! └── ...
//! ```
//!
//! ## Parallel Processing
//!
//! Photos are prepared in parallel with [rayon](https://docs.rs/rayon). The
//! cache manifest is shared behind a `Mutex`; progress is streamed over an
//! optional `mpsc` channel so the CLI can print as work completes.

use crate::cache::{self, CacheManifest, CacheStats};
use crate::color::Palette;
use crate::config::CalendarConfig;
use crate::imaging::{BackendError, Dimensions, ImageBackend, PrepareParams, Quality, RustBackend};
use crate::photos::{PhotoSet, PhotoStore, SourcePhoto, StoreError, TITLE_SLOT};
use crate::types::Variant;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Name of the prepared set manifest within the prepared directory.
pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
}

/// Preparation parameters, taken from `[photos]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareConfig {
    pub width: u32,
    pub height: u32,
    pub quality: u32,
    pub title_palette: usize,
    pub month_palette: usize,
}

impl PrepareConfig {
    pub fn from_calendar_config(config: &CalendarConfig) -> Self {
        Self {
            width: config.photos.width,
            height: config.photos.height,
            quality: config.photos.quality,
            title_palette: config.photos.title_palette,
            month_palette: config.photos.month_palette,
        }
    }

    /// Palette size for the page `slot` appears on.
    pub fn palette_size(&self, slot: u32) -> usize {
        if slot == TITLE_SLOT {
            self.title_palette
        } else {
            self.month_palette
        }
    }
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self::from_calendar_config(&CalendarConfig::default())
    }
}

/// How a prepared file came to exist in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantStatus {
    /// Already on disk under the right name.
    Cached,
    /// Found under another name and copied.
    Copied,
    /// Decoded, resized and encoded from the source.
    Encoded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantInfo {
    pub variant: Variant,
    pub status: VariantStatus,
}

/// Progress reported while preparing.
#[derive(Debug, Clone, PartialEq)]
pub enum PrepareEvent {
    Started {
        photo_count: usize,
    },
    PhotoPrepared {
        slot: u32,
        caption: String,
        source_path: String,
        variants: Vec<VariantInfo>,
        palette: Palette,
        palette_cached: bool,
    },
}

/// One slot's prepared files and palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedPhoto {
    pub slot: u32,
    pub caption: String,
    pub source: PathBuf,
    pub normal: PathBuf,
    pub mirrored: PathBuf,
    pub palette: Palette,
}

/// All prepared photos, ordered by slot. The production [`PhotoStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedSet {
    pub photos: Vec<PreparedPhoto>,
}

impl PreparedSet {
    fn find(&self, slot: u32) -> Option<&PreparedPhoto> {
        self.photos.iter().find(|p| p.slot == slot)
    }

    pub fn save(&self, dir: &Path) -> Result<(), PrepareError> {
        std::fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join(MANIFEST_FILENAME), json)?;
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self, PrepareError> {
        let content = std::fs::read_to_string(dir.join(MANIFEST_FILENAME))?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl PhotoStore for PreparedSet {
    fn photo(&self, slot: u32, variant: Variant) -> Result<&Path, StoreError> {
        let photo = self
            .find(slot)
            .ok_or(StoreError::MissingPhoto { slot, variant })?;
        Ok(match variant {
            Variant::Normal => &photo.normal,
            Variant::Mirrored => &photo.mirrored,
        })
    }

    fn palette(&self, slot: u32) -> Result<&Palette, StoreError> {
        self.find(slot)
            .map(|p| &p.palette)
            .ok_or(StoreError::MissingPalette(slot))
    }
}

pub struct PrepareResult {
    pub set: PreparedSet,
    pub cache_stats: CacheStats,
}

/// File name of a prepared variant: `03-mirrored.jpg`.
pub fn prepared_file_name(slot: u32, variant: Variant) -> String {
    format!("{slot:02}-{variant}.jpg")
}

/// Prepare every photo with the pure-Rust backend.
pub fn prepare(
    photos: &PhotoSet,
    output_dir: &Path,
    config: &PrepareConfig,
    use_cache: bool,
    progress: Option<Sender<PrepareEvent>>,
) -> Result<PrepareResult, PrepareError> {
    let backend = RustBackend::new();
    prepare_with_backend(&backend, photos, output_dir, config, use_cache, progress)
}

/// Prepare every photo using a specific backend (allows testing with mock).
pub fn prepare_with_backend(
    backend: &impl ImageBackend,
    photos: &PhotoSet,
    output_dir: &Path,
    config: &PrepareConfig,
    use_cache: bool,
    progress: Option<Sender<PrepareEvent>>,
) -> Result<PrepareResult, PrepareError> {
    std::fs::create_dir_all(output_dir)?;

    let manifest = if use_cache {
        CacheManifest::load(output_dir)
    } else {
        CacheManifest::empty()
    };
    let cache = Mutex::new(manifest);

    if let Some(tx) = &progress {
        tx.send(PrepareEvent::Started {
            photo_count: photos.len(),
        })
        .ok();
    }

    let outcomes: Vec<(PreparedPhoto, Vec<VariantInfo>)> = photos
        .photos()
        .par_iter()
        .map(|photo| {
            let (prepared, variants, palette_cached) =
                prepare_one(backend, photo, output_dir, config, &cache)?;
            if let Some(tx) = &progress {
                tx.send(PrepareEvent::PhotoPrepared {
                    slot: photo.slot,
                    caption: photo.caption.clone(),
                    source_path: photo.path.display().to_string(),
                    variants: variants.clone(),
                    palette: prepared.palette.clone(),
                    palette_cached,
                })
                .ok();
            }
            Ok((prepared, variants))
        })
        .collect::<Result<_, PrepareError>>()?;

    let mut cache_stats = CacheStats::default();
    for info in outcomes.iter().flat_map(|(_, v)| v) {
        match info.status {
            VariantStatus::Cached => cache_stats.hit(),
            VariantStatus::Copied => cache_stats.copy(),
            VariantStatus::Encoded => cache_stats.miss(),
        }
    }

    let mut manifest = cache.into_inner().unwrap_or_else(|e| e.into_inner());
    manifest.save(output_dir)?;

    let set = PreparedSet {
        photos: outcomes.into_iter().map(|(p, _)| p).collect(),
    };
    set.save(output_dir)?;
    tracing::info!(dir = %output_dir.display(), cache = %cache_stats, "photos prepared");

    Ok(PrepareResult { set, cache_stats })
}

fn prepare_one(
    backend: &impl ImageBackend,
    photo: &SourcePhoto,
    output_dir: &Path,
    config: &PrepareConfig,
    cache: &Mutex<CacheManifest>,
) -> Result<(PreparedPhoto, Vec<VariantInfo>, bool), PrepareError> {
    let source_hash = cache::hash_file(&photo.path)?;
    let mut variants = Vec::with_capacity(Variant::ALL.len());

    for variant in Variant::ALL {
        let name = prepared_file_name(photo.slot, variant);
        let params_hash = cache::hash_prepare_params(
            config.width,
            config.height,
            config.quality,
            variant.is_mirrored(),
        );
        let cached = lock(cache).find_cached(&source_hash, &params_hash, output_dir);
        let status = match cached {
            Some(stored) if stored == name => VariantStatus::Cached,
            Some(stored) => {
                std::fs::copy(output_dir.join(&stored), output_dir.join(&name))?;
                VariantStatus::Copied
            }
            None => {
                backend.prepare(&PrepareParams {
                    source: photo.path.clone(),
                    output: output_dir.join(&name),
                    width: config.width,
                    height: config.height,
                    quality: Quality::new(config.quality),
                    flip_vertical: variant.is_mirrored(),
                })?;
                VariantStatus::Encoded
            }
        };
        tracing::debug!(slot = photo.slot, %variant, ?status, "prepared photo");
        lock(cache).insert(name, source_hash.clone(), params_hash);
        variants.push(VariantInfo { variant, status });
    }

    let size = config.palette_size(photo.slot);
    let memoized = lock(cache).find_palette(&source_hash, size).cloned();
    let palette_cached = memoized.is_some();
    let palette = match memoized {
        Some(palette) => palette,
        None => {
            let palette = backend.palette(&photo.path, size)?;
            lock(cache).insert_palette(&source_hash, size, palette.clone());
            palette
        }
    };

    let prepared = PreparedPhoto {
        slot: photo.slot,
        caption: photo.caption.clone(),
        source: photo.path.clone(),
        normal: output_dir.join(prepared_file_name(photo.slot, Variant::Normal)),
        mirrored: output_dir.join(prepared_file_name(photo.slot, Variant::Mirrored)),
        palette,
    };
    Ok((prepared, variants, palette_cached))
}

fn lock(cache: &Mutex<CacheManifest>) -> std::sync::MutexGuard<'_, CacheManifest> {
    cache.lock().unwrap_or_else(|e| e.into_inner())
}

/// Pixel dimensions of every source photo, for `check`.
pub fn inspect_sources(
    backend: &impl ImageBackend,
    photos: &PhotoSet,
) -> Result<Vec<(SourcePhoto, Dimensions)>, PrepareError> {
    photos
        .photos()
        .iter()
        .map(|photo| Ok((photo.clone(), backend.identify(&photo.path)?)))
        .collect()
}
