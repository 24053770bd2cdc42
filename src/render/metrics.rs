//! Advance widths for the standard Helvetica faces.
//!
//! The PDF uses the non-embedded standard-14 fonts, so measuring text only
//! needs the published AFM widths (units of 1/1000 em). Printable ASCII is
//! covered exactly; anything else is measured as a digit-wide glyph.

use super::{Font, TextMeasure};

const FIRST: u32 = 32;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const FALLBACK_WIDTH: u16 = 556;

fn glyph_width(c: char, font: Font) -> u16 {
    let table = match font {
        Font::Regular => &HELVETICA,
        Font::Bold => &HELVETICA_BOLD,
    };
    (c as u32)
        .checked_sub(FIRST)
        .and_then(|i| table.get(i as usize))
        .copied()
        .unwrap_or(FALLBACK_WIDTH)
}

/// [`TextMeasure`] for Helvetica / Helvetica-Bold.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMetrics;

impl TextMeasure for HelveticaMetrics {
    fn text_width(&self, text: &str, font: Font, size: f64) -> f64 {
        let units: u32 = text.chars().map(|c| glyph_width(c, font) as u32).sum();
        units as f64 * size / 1000.0
    }
}

/// Encode text for a WinAnsiEncoding simple font.
///
/// Latin-1 maps straight through; a few common typographic characters map
/// to their cp1252 slots; anything else becomes `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_half_an_em_wide() {
        // Four digits at 100pt: 4 * 556 / 1000 * 100.
        let w = HelveticaMetrics.text_width("2025", Font::Regular, 100.0);
        assert!((w - 222.4).abs() < 1e-9);
    }

    #[test]
    fn bold_is_wider_for_lowercase() {
        let regular = HelveticaMetrics.text_width("january", Font::Regular, 12.0);
        let bold = HelveticaMetrics.text_width("january", Font::Bold, 12.0);
        assert!(bold > regular);
    }

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(HelveticaMetrics.text_width("", Font::Bold, 72.0), 0.0);
    }

    #[test]
    fn non_ascii_uses_fallback_width() {
        let w = HelveticaMetrics.text_width("é", Font::Regular, 1000.0);
        assert_eq!(w, FALLBACK_WIDTH as f64);
    }

    #[test]
    fn win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Mai"), b"Mai".to_vec());
        assert_eq!(encode_win_ansi("é"), vec![0xe9]);
        assert_eq!(encode_win_ansi("a–b"), vec![b'a', 0x96, b'b']);
        assert_eq!(encode_win_ansi("日"), vec![b'?']);
    }
}
