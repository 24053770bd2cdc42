//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the three operations the calendar
//! needs from pixels: identify, prepare and palette. The production
//! implementation is [`RustBackend`](super::rust_backend::RustBackend).

use super::params::PrepareParams;
use crate::color::Palette;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` so the prepare stage can share one backend across rayon workers.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize-to-fill, optionally flip, and write a JPEG.
    fn prepare(&self, params: &PrepareParams) -> Result<(), BackendError>;

    /// Average color and a palette of at most `size` colors, most common
    /// first. Deterministic for a given file and size.
    fn palette(&self, path: &Path, size: usize) -> Result<Palette, BackendError>;
}
