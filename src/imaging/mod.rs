//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Prepare** | `resize_to_fill` (Lanczos3) + optional `flipv` → JPEG |
//! | **Palette** | downsample to ≤ 128 px, mean color + median cut |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for sampling and quantization (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{PALETTE_SAMPLE_EDGE, mean_color, median_cut};
pub use params::{PrepareParams, Quality};
pub use rust_backend::{RustBackend, supported_input_extensions};
