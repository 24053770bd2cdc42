//! Colors, palettes, and perceptual distance.
//!
//! Photos contribute a [`Palette`] (a handful of dominant colors plus their
//! average); label colors are picked from it by
//! [`contrast::select_colors`](crate::contrast::select_colors). Whether two
//! colors are "different enough" is decided by a [`ColorDistance`], which is
//! a trait so tests can swap in a trivially predictable metric.
//!
//! ## CIEDE2000
//!
//! The production metric is [`Ciede2000`]: both colors go through the
//! `palette` crate from sRGB to linear RGB to CIELAB (D65) and are compared
//! with its ΔE₀₀. A ΔE of roughly 2 is a just-noticeable difference; the
//! default legibility threshold of 20 asks for colors that are clearly
//! distinct.

use palette::color_difference::Ciede2000 as _;
use palette::{FromColor, Lab, Srgb};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An sRGB color, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Channel-wise `255 - v`.
    pub fn invert(self) -> Self {
        Self(255 - self.0, 255 - self.1, 255 - self.2)
    }

    /// Channels scaled to `0.0..=1.0`, as PDF fill colors expect.
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// CIELAB under D65.
    pub fn to_lab(self) -> Lab {
        Lab::from_color(
            Srgb::new(self.0, self.1, self.2)
                .into_format::<f32>()
                .into_linear(),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Dominant colors of one photo, never empty.
///
/// Built by the palette extractor. If extraction produced no colors at all
/// (a degenerate image), the palette degrades to the single average color
/// so selection always has something to choose from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<Rgb>,
    average: Rgb,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>, average: Rgb) -> Self {
        let colors = if colors.is_empty() {
            vec![average]
        } else {
            colors
        };
        Self { colors, average }
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// The photo's mean color, used as the outline fallback.
    pub fn average(&self) -> Rgb {
        self.average
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Foreground and outline colors for one outlined label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPair {
    pub foreground: Rgb,
    pub outline: Rgb,
}

/// Perceptual distance between two colors.
///
/// Implementations must be symmetric and non-negative; larger means more
/// visually distinguishable.
pub trait ColorDistance {
    fn distance(&self, a: Rgb, b: Rgb) -> f64;
}

/// CIE ΔE 2000 over D65 CIELAB.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ciede2000;

impl ColorDistance for Ciede2000 {
    fn distance(&self, a: Rgb, b: Rgb) -> f64 {
        f64::from(a.to_lab().difference(b.to_lab()))
    }
}

/// Plain Euclidean distance in sRGB byte space (0 – ~441.7).
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanRgb;

impl ColorDistance for EuclideanRgb {
    fn distance(&self, a: Rgb, b: Rgb) -> f64 {
        let dr = a.0 as f64 - b.0 as f64;
        let dg = a.1 as f64 - b.1 as f64;
        let db = a.2 as f64 - b.2 as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::color_difference::Ciede2000 as _;

    fn lab_distance(l1: f32, a1: f32, b1: f32, l2: f32, a2: f32, b2: f32) -> f64 {
        let (x, y): (Lab, Lab) = (Lab::new(l1, a1, b1), Lab::new(l2, a2, b2));
        f64::from(x.difference(y))
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    // =========================================================================
    // Rgb
    // =========================================================================

    #[test]
    fn invert_flips_each_channel() {
        assert_eq!(Rgb(0, 128, 255).invert(), Rgb(255, 127, 0));
        assert_eq!(Rgb::BLACK.invert(), Rgb::WHITE);
    }

    #[test]
    fn to_hex_is_lowercase_padded() {
        assert_eq!(Rgb(1, 171, 255).to_hex(), "#01abff");
        assert_eq!(format!("{}", Rgb(0, 0, 0)), "#000000");
    }

    #[test]
    fn rgb_serializes_as_array() {
        let json = serde_json::to_string(&Rgb(1, 2, 3)).unwrap();
        assert_eq!(json, "[1,2,3]");
    }

    // =========================================================================
    // Palette
    // =========================================================================

    #[test]
    fn empty_palette_falls_back_to_average() {
        let p = Palette::new(vec![], Rgb(10, 20, 30));
        assert_eq!(p.colors(), &[Rgb(10, 20, 30)]);
        assert_eq!(p.len(), 1);
        assert!(!p.is_empty());
    }

    #[test]
    fn palette_keeps_order() {
        let p = Palette::new(vec![Rgb(3, 3, 3), Rgb(1, 1, 1)], Rgb(2, 2, 2));
        assert_eq!(p.colors(), &[Rgb(3, 3, 3), Rgb(1, 1, 1)]);
        assert_eq!(p.average(), Rgb(2, 2, 2));
    }

    // =========================================================================
    // CIELAB + CIEDE2000
    // =========================================================================

    #[test]
    fn white_has_lightness_100() {
        let l = Rgb::WHITE.to_lab();
        assert_close(f64::from(l.l), 100.0, 0.01);
        assert_close(f64::from(l.a), 0.0, 0.01);
        assert_close(f64::from(l.b), 0.0, 0.01);
    }

    #[test]
    fn black_has_lightness_0() {
        assert_close(f64::from(Rgb::BLACK.to_lab().l), 0.0, 1e-4);
    }

    #[test]
    fn delta_e_2000_reference_pairs() {
        // Sharma, Wu & Dalal (2005) test data, pairs 1 and 7.
        assert_close(
            lab_distance(50.0, 2.6772, -79.7751, 50.0, 0.0, -82.7485),
            2.0425,
            1e-3,
        );
        assert_close(lab_distance(50.0, 0.0, 0.0, 50.0, -1.0, 2.0), 2.3669, 1e-3);
    }

    #[test]
    fn delta_e_2000_identical_is_zero() {
        let c = Rgb(12, 200, 90);
        assert_close(Ciede2000.distance(c, c), 0.0, 1e-6);
    }

    #[test]
    fn ciede2000_is_symmetric() {
        let pairs = [
            (Rgb(255, 0, 0), Rgb(0, 0, 255)),
            (Rgb(20, 30, 40), Rgb(200, 180, 10)),
            (Rgb(128, 128, 128), Rgb(130, 126, 129)),
        ];
        for (a, b) in pairs {
            assert_close(Ciede2000.distance(a, b), Ciede2000.distance(b, a), 1e-3);
        }
    }

    #[test]
    fn black_and_white_are_far_apart() {
        assert!(Ciede2000.distance(Rgb::BLACK, Rgb::WHITE) > 90.0);
    }

    #[test]
    fn near_grays_are_below_threshold() {
        assert!(Ciede2000.distance(Rgb(120, 120, 120), Rgb(124, 124, 124)) < 20.0);
    }

    #[test]
    fn euclidean_rgb_distance() {
        assert_close(EuclideanRgb.distance(Rgb(0, 0, 0), Rgb(3, 4, 0)), 5.0, 1e-12);
    }
}
