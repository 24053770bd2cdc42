//! Pure pixel math: sampling size, mean color, median-cut palette.
//!
//! Nothing here touches files or decoders, so palette behavior is unit
//! testable with hand-written pixel lists.

use crate::color::Rgb;
use std::cmp::Reverse;

/// Longest edge of the sample a palette is computed from.
pub const PALETTE_SAMPLE_EDGE: u32 = 128;

/// Dimensions of a sample that fits inside `max_edge` on both axes, keeping
/// the aspect ratio. Images already small enough are not upscaled.
pub fn sample_dimensions(source: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (w, h) = source;
    let longer = w.max(h);
    if longer <= max_edge || longer == 0 {
        return (w, h);
    }
    let scale = max_edge as f64 / longer as f64;
    let scaled = |v: u32| ((v as f64 * scale).round() as u32).max(1);
    (scaled(w), scaled(h))
}

/// Rounded per-channel mean. An empty slice is black.
pub fn mean_color(pixels: &[[u8; 3]]) -> Rgb {
    if pixels.is_empty() {
        return Rgb::BLACK;
    }
    let n = pixels.len() as u64;
    let mut sums = [0u64; 3];
    for p in pixels {
        for (sum, &v) in sums.iter_mut().zip(p) {
            *sum += u64::from(v);
        }
    }
    let avg = |sum: u64| ((sum + n / 2) / n) as u8;
    Rgb(avg(sums[0]), avg(sums[1]), avg(sums[2]))
}

/// Channel with the largest value range in `pixels`, and that range.
/// Ties go to the lower channel (R before G before B).
fn widest_channel(pixels: &[[u8; 3]]) -> (usize, u8) {
    let mut best = (0, 0);
    for channel in 0..3 {
        let (min, max) = pixels
            .iter()
            .map(|p| p[channel])
            .fold((u8::MAX, u8::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let range = max.saturating_sub(min);
        if range > best.1 {
            best = (channel, range);
        }
    }
    best
}

/// Median-cut quantization to at most `max_colors` colors, most populous
/// first.
///
/// The box with the widest channel range is split at the median of that
/// channel until there are `max_colors` boxes or no box has any spread
/// left. Each box contributes its mean color. Deterministic for a given
/// pixel list.
pub fn median_cut(pixels: &[[u8; 3]], max_colors: usize) -> Vec<Rgb> {
    if pixels.is_empty() || max_colors == 0 {
        return Vec::new();
    }

    let mut boxes: Vec<Vec<[u8; 3]>> = vec![pixels.to_vec()];
    while boxes.len() < max_colors {
        let widest = boxes
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let (channel, range) = widest_channel(b);
                (i, channel, range)
            })
            .filter(|&(_, _, range)| range > 0)
            .max_by_key(|&(i, _, range)| (range, Reverse(i)));
        let Some((index, channel, _)) = widest else {
            break;
        };

        let target = &mut boxes[index];
        target.sort_unstable_by_key(|p| (p[channel], p[0], p[1], p[2]));
        let upper = target.split_off(target.len() / 2);
        boxes.push(upper);
    }

    let mut colors: Vec<(usize, Rgb)> = boxes.iter().map(|b| (b.len(), mean_color(b))).collect();
    colors.sort_by_key(|&(population, _)| Reverse(population));
    colors.into_iter().map(|(_, color)| color).collect()
}
