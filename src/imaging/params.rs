//! What the prepare stage asks a backend to do.
//!
//! These structs describe *what* to do, not *how*. The prepare stage builds
//! them; the [`backend`](super::backend) executes them. Tests swap in a mock
//! backend and assert on the parameters alone.
//!
//! - [`Quality`]: JPEG quality (1–100, default 90). Clamped on construction.
//! - [`PrepareParams`]: source, output, fixed target resolution, quality,
//!   and whether to flip the result vertically (mirrored variant).

use std::path::PathBuf;

/// JPEG encoder quality, always within 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Resize-to-fill (center crop) to exactly `width`×`height`, optionally
/// flipped top-to-bottom, encoded as JPEG at `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    pub flip_vertical: bool,
}
