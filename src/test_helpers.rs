//! Shared test utilities: synthetic photo fixtures.
//!
//! Tests never depend on checked-in images. Every fixture is generated with
//! the `image` crate into a temp directory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_photo_dir();
//! let photos = discover(tmp.path()).unwrap();
//! assert_eq!(photos.len(), 13);
//! ```

use crate::color::Rgb;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageEncoder, RgbImage};
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Single images
// =========================================================================

fn write_jpeg(path: &Path, img: &RgbImage) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    JpegEncoder::new_with_quality(writer, 95)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
}

/// Solid-color JPEG.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32, color: Rgb) {
    let img = RgbImage::from_pixel(width, height, image::Rgb([color.0, color.1, color.2]));
    write_jpeg(path, &img);
}

/// JPEG whose top half is `top` and bottom half is `bottom`.
pub fn write_split_jpeg(path: &Path, width: u32, height: u32, top: Rgb, bottom: Rgb) {
    let img = RgbImage::from_fn(width, height, |_, y| {
        let c = if y < height / 2 { top } else { bottom };
        image::Rgb([c.0, c.1, c.2])
    });
    write_jpeg(path, &img);
}

// =========================================================================
// Photo directories
// =========================================================================

/// File stems of a complete photo set: title plus twelve months.
pub const PHOTO_STEMS: [&str; 13] = [
    "00-title",
    "01-january",
    "02-february",
    "03-march",
    "04-april",
    "05-may",
    "06-june",
    "07-july",
    "08-august",
    "09-september",
    "10-october",
    "11-november",
    "12-december",
];

/// Temp directory holding a complete, small, two-tone photo set.
pub fn setup_photo_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (i, stem) in PHOTO_STEMS.iter().enumerate() {
        let shade = (i as u8) * 18;
        write_split_jpeg(
            &tmp.path().join(format!("{stem}.jpg")),
            48,
            36,
            Rgb(255 - shade, 200, shade),
            Rgb(shade, 40, 255 - shade),
        );
    }
    tmp
}
