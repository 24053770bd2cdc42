//! Legible label colors picked from a photo's palette.
//!
//! Labels are drawn with an outline so they read against any photo. The
//! foreground is a palette color (optionally inverted), the outline is
//! another palette color that is perceptually far enough from it. When no
//! palette color qualifies (a one-color palette, or a photo whose colors
//! are all alike), the outline falls back to the photo's average color.
//! That fallback can produce a low-contrast pair; it is accepted rather
//! than treated as an error.

use crate::color::{ColorDistance, ColorPair, Palette};
use crate::random::RandomStream;

/// Default perceptual-distance threshold (ΔE₀₀) between foreground and outline.
pub const DEFAULT_THRESHOLD: f64 = 20.0;

/// Choose a foreground/outline pair from `palette`.
///
/// Consumes exactly two draws from `stream`: one for the base color, one
/// for the outline.
pub fn select_colors(
    stream: &mut RandomStream,
    palette: &Palette,
    distance: &dyn ColorDistance,
    threshold: f64,
    invert: bool,
) -> ColorPair {
    let base = stream
        .choice(palette.colors())
        .copied()
        .unwrap_or_else(|| palette.average());
    let foreground = if invert { base.invert() } else { base };

    let mut candidates: Vec<_> = palette
        .colors()
        .iter()
        .copied()
        .filter(|&c| distance.distance(c, foreground) > threshold)
        .collect();
    if candidates.is_empty() {
        candidates.push(palette.average());
    }

    let outline = stream
        .choice(&candidates)
        .copied()
        .unwrap_or_else(|| palette.average());

    ColorPair {
        foreground,
        outline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Ciede2000, EuclideanRgb, Rgb};

    #[test]
    fn black_and_white_pick_each_other() {
        let palette = Palette::new(vec![Rgb::BLACK, Rgb::WHITE], Rgb(128, 128, 128));
        for seed in 0..32 {
            let mut stream = RandomStream::new(seed);
            let pair = select_colors(&mut stream, &palette, &Ciede2000, 20.0, false);
            assert_ne!(pair.foreground, pair.outline);
            assert!(Ciede2000.distance(pair.foreground, pair.outline) > 20.0);
        }
    }

    #[test]
    fn single_color_palette_falls_back_to_average() {
        let palette = Palette::new(vec![Rgb(90, 90, 90)], Rgb(91, 92, 93));
        let mut stream = RandomStream::new(1);
        let pair = select_colors(&mut stream, &palette, &Ciede2000, 20.0, false);
        assert_eq!(pair.foreground, Rgb(90, 90, 90));
        assert_eq!(pair.outline, Rgb(91, 92, 93));
    }

    #[test]
    fn identical_colors_may_yield_low_contrast_pair() {
        let gray = Rgb(100, 100, 100);
        let palette = Palette::new(vec![gray, gray, gray], gray);
        let mut stream = RandomStream::new(2);
        let pair = select_colors(&mut stream, &palette, &Ciede2000, 20.0, false);
        assert_eq!(pair.foreground, gray);
        assert_eq!(pair.outline, gray);
    }

    #[test]
    fn outline_respects_threshold_when_candidate_exists() {
        let palette = Palette::new(
            vec![Rgb(10, 10, 10), Rgb(12, 12, 12), Rgb(240, 240, 240), Rgb(200, 30, 30)],
            Rgb(115, 70, 70),
        );
        for seed in 0..64 {
            let mut stream = RandomStream::new(seed);
            let pair = select_colors(&mut stream, &palette, &Ciede2000, 20.0, false);
            assert!(
                Ciede2000.distance(pair.foreground, pair.outline) > 20.0,
                "seed {seed}: {pair:?}"
            );
            assert!(palette.colors().contains(&pair.outline));
        }
    }

    #[test]
    fn inversion_applies_to_foreground() {
        let palette = Palette::new(vec![Rgb(0, 0, 0)], Rgb(0, 0, 0));
        let mut stream = RandomStream::new(3);
        let pair = select_colors(&mut stream, &palette, &EuclideanRgb, 20.0, true);
        assert_eq!(pair.foreground, Rgb::WHITE);
        // Black is far from inverted white, so it qualifies as the outline.
        assert_eq!(pair.outline, Rgb::BLACK);
    }

    #[test]
    fn same_seed_same_pair() {
        let palette = Palette::new(
            vec![Rgb(200, 10, 10), Rgb(10, 200, 10), Rgb(10, 10, 200), Rgb(250, 250, 250)],
            Rgb(118, 118, 118),
        );
        let mut a = RandomStream::new(42);
        let mut b = RandomStream::new(42);
        for _ in 0..10 {
            assert_eq!(
                select_colors(&mut a, &palette, &Ciede2000, DEFAULT_THRESHOLD, true),
                select_colors(&mut b, &palette, &Ciede2000, DEFAULT_THRESHOLD, true)
            );
        }
    }
}
