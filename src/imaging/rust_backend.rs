//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Identify | `image::image_dimensions` (header only) |
//! | Resize-to-fill | `DynamicImage::resize_to_fill` with `Lanczos3` |
//! | Vertical flip | `DynamicImage::flipv` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Palette sample | `DynamicImage::thumbnail_exact` (≤ 128 px) + [`median_cut`] |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{PALETTE_SAMPLE_EDGE, mean_color, median_cut, sample_dimensions};
use super::params::PrepareParams;
use crate::color::Palette;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions paired with the decoder each one needs.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode as baseline RGB JPEG.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100) as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn prepare(&self, params: &PrepareParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let filled = img.resize_to_fill(params.width, params.height, FilterType::Lanczos3);
        let final_img = if params.flip_vertical {
            filled.flipv()
        } else {
            filled
        };
        save_jpeg(&final_img, &params.output, params.quality.value())
    }

    fn palette(&self, path: &Path, size: usize) -> Result<Palette, BackendError> {
        let img = load_image(path)?;
        let (w, h) = sample_dimensions((img.width(), img.height()), PALETTE_SAMPLE_EDGE);
        let sample = if (w, h) == (img.width(), img.height()) {
            img.to_rgb8()
        } else {
            img.thumbnail_exact(w, h).to_rgb8()
        };
        let pixels: Vec<[u8; 3]> = sample.pixels().map(|p| p.0).collect();
        Ok(Palette::new(median_cut(&pixels, size), mean_color(&pixels)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::imaging::params::Quality;
    use crate::test_helpers::{write_split_jpeg, write_test_jpeg};
    use tempfile::TempDir;

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "tif", "tiff", "webp"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        write_test_jpeg(&path, 200, 150, Rgb(10, 20, 30));

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!(dims, Dimensions { width: 200, height: 150 });
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let result = RustBackend::new().identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn prepare_fills_exact_dimensions() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("portrait.jpg");
        write_test_jpeg(&source, 300, 500, Rgb(200, 100, 50));
        let output = tmp.path().join("out/prepared.jpg");

        RustBackend::new()
            .prepare(&PrepareParams {
                source,
                output: output.clone(),
                width: 120,
                height: 90,
                quality: Quality::new(85),
                flip_vertical: false,
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (120, 90));
    }

    #[test]
    fn prepare_flip_moves_top_to_bottom() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("split.jpg");
        // Top half white, bottom half black.
        write_split_jpeg(&source, 64, 64, Rgb::WHITE, Rgb::BLACK);
        let output = tmp.path().join("flipped.jpg");

        RustBackend::new()
            .prepare(&PrepareParams {
                source,
                output: output.clone(),
                width: 64,
                height: 64,
                quality: Quality::new(95),
                flip_vertical: true,
            })
            .unwrap();

        let img = image::open(&output).unwrap().to_rgb8();
        assert!(img.get_pixel(32, 4).0[0] < 60, "top should now be dark");
        assert!(img.get_pixel(32, 60).0[0] > 200, "bottom should now be light");
    }

    #[test]
    fn palette_of_two_tone_image() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("split.jpg");
        write_split_jpeg(&path, 256, 256, Rgb(250, 250, 250), Rgb(5, 5, 5));

        let palette = RustBackend::new().palette(&path, 2).unwrap();
        assert_eq!(palette.len(), 2);
        let lum = |c: &Rgb| c.0 as u32 + c.1 as u32 + c.2 as u32;
        let lums: Vec<u32> = palette.colors().iter().map(lum).collect();
        assert!(lums.iter().any(|&l| l > 600), "{lums:?}");
        assert!(lums.iter().any(|&l| l < 60), "{lums:?}");
        let avg = palette.average();
        assert!((100..=160).contains(&avg.0), "average {avg}");
    }

    #[test]
    fn palette_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("p.jpg");
        write_split_jpeg(&path, 300, 200, Rgb(20, 120, 220), Rgb(220, 60, 20));
        let backend = RustBackend::new();
        assert_eq!(
            backend.palette(&path, 4).unwrap(),
            backend.palette(&path, 4).unwrap()
        );
    }

    #[test]
    fn prepare_unreadable_source_errors() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("fake.jpg");
        std::fs::write(&source, b"not an image").unwrap();
        let result = RustBackend::new().prepare(&PrepareParams {
            source,
            output: tmp.path().join("out.jpg"),
            width: 10,
            height: 10,
            quality: Quality::default(),
            flip_vertical: false,
        });
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }
}
