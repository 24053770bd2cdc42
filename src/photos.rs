//! Source photo discovery and the prepared-photo store contract.
//!
//! A calendar needs exactly 13 photos: slot 0 for the title page and slots
//! 1–12 for the months. [`discover`] finds them in a flat directory using
//! the [`naming`](crate::naming) convention; files in unsupported formats,
//! hidden files and stems that name no slot are ignored. Two files claiming
//! the same slot, or a slot nobody claims, is an error.
//!
//! The composer does not read source photos. It asks a [`PhotoStore`] for
//! prepared files and palettes; [`PreparedSet`](crate::prepare::PreparedSet)
//! is the production store.

use crate::color::Palette;
use crate::imaging::supported_input_extensions;
use crate::naming::{LAST_SLOT, parse_photo_stem};
use crate::types::Variant;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of photo slots: title plus twelve months.
pub const SLOT_COUNT: usize = LAST_SLOT as usize + 1;

/// Slot of the title page photo.
pub const TITLE_SLOT: u32 = 0;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Photo directory not found: {0}")]
    NotFound(PathBuf),
    #[error("Duplicate photo for slot {slot}: {first} and {second}")]
    DuplicateSlot {
        slot: u32,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("No photo for slot(s) {0:?} (0 = title, 1-12 = months)")]
    MissingSlots(Vec<u32>),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("No prepared photo for slot {slot} ({variant})")]
    MissingPhoto { slot: u32, variant: Variant },
    #[error("No palette for slot {0}")]
    MissingPalette(u32),
}

/// Where the composer gets photos and palettes from.
///
/// Implementations are idempotent: the same slot and variant always map to
/// the same file.
pub trait PhotoStore {
    /// Prepared photo for `slot`. The mirrored variant is flipped
    /// vertically.
    fn photo(&self, slot: u32, variant: Variant) -> Result<&Path, StoreError>;

    /// Palette of the photo in `slot`, sized for the page it appears on.
    fn palette(&self, slot: u32) -> Result<&Palette, StoreError>;
}

/// One source photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePhoto {
    pub slot: u32,
    pub path: PathBuf,
    pub caption: String,
}

/// All 13 source photos, ordered by slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSet {
    photos: Vec<SourcePhoto>,
}

impl PhotoSet {
    pub fn photos(&self) -> &[SourcePhoto] {
        &self.photos
    }

    pub fn get(&self, slot: u32) -> Option<&SourcePhoto> {
        self.photos.get(slot as usize)
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}

fn is_photo(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    supported_input_extensions().contains(&ext.as_str())
}

/// Find the 13 calendar photos in `dir`.
pub fn discover(dir: &Path) -> Result<PhotoSet, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::NotFound(dir.to_path_buf()));
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .is_some_and(|name| !name.to_string_lossy().starts_with('.'))
        })
        .filter(|p| is_photo(p))
        .collect();
    entries.sort();

    let mut slots: Vec<Option<SourcePhoto>> = vec![None; SLOT_COUNT];
    for path in entries {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parsed = parse_photo_stem(&stem);
        let Some(slot) = parsed.slot else {
            tracing::debug!(path = %path.display(), "ignoring photo with no calendar slot");
            continue;
        };

        let entry = &mut slots[slot as usize];
        if let Some(existing) = entry {
            return Err(ScanError::DuplicateSlot {
                slot,
                first: existing.path.clone(),
                second: path,
            });
        }
        *entry = Some(SourcePhoto {
            slot,
            path,
            caption: parsed.caption,
        });
    }

    let missing: Vec<u32> = slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_none())
        .map(|(i, _)| i as u32)
        .collect();
    if !missing.is_empty() {
        return Err(ScanError::MissingSlots(missing));
    }

    Ok(PhotoSet {
        photos: slots.into_iter().flatten().collect(),
    })
}
