//! Page rendering: the drawing surface the composer talks to.
//!
//! The composer never touches a file format. It issues a small vocabulary
//! of instructions through [`PageRenderer`]:
//!
//! | Instruction | Meaning |
//! |---|---|
//! | `begin_page` | start a new page of the configured size |
//! | `draw_image` | place an image file into a rectangle |
//! | `draw_text` | draw one [`TextRun`] at a baseline origin |
//! | `begin_rotation` / `end_rotation` | scope a rotation about a point |
//! | `draw_table` | draw a ruled [`Table`] with header and rows |
//! | `finish` | write the document |
//!
//! Coordinates are inches from the bottom-left corner, y up. Two
//! implementations exist:
//! - [`PdfRenderer`] writes a PDF with `pdf-writer`.
//! - [`RecordingRenderer`] keeps the instructions in memory, used for
//!   dry runs (`cuckoo-calendar plan`) and tests.

pub mod metrics;
pub mod pdf;
pub mod recording;

pub use metrics::HelveticaMetrics;
pub use pdf::PdfRenderer;
pub use recording::{RecordingRenderer, RenderOp};

use crate::color::Rgb;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to embed image {path}: {reason}")]
    Image { path: String, reason: String },
    #[error("Drawing instruction issued before begin_page")]
    NoPage,
    #[error("Rotation scopes are unbalanced")]
    UnbalancedRotation,
    #[error("Document was already finished")]
    Finished,
}

/// Built-in font faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    Regular,
    Bold,
}

/// Page dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

impl Default for PageSize {
    /// US Letter, landscape.
    fn default() -> Self {
        Self {
            width: 11.0,
            height: 8.5,
        }
    }
}

/// Rectangle in inches; `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One string drawn at a baseline origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font: Font,
    /// Size in points.
    pub size: f64,
    pub color: Rgb,
}

/// A ruled grid: one header row plus body rows, all columns equal width.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Left edge, inches.
    pub x: f64,
    /// Top edge, inches.
    pub top: f64,
    pub column_width: f64,
    pub header_height: f64,
    pub row_height: f64,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub header_size: f64,
    pub cell_size: f64,
    pub text_color: Rgb,
    pub line_color: Rgb,
}

impl Table {
    pub fn width(&self) -> f64 {
        self.column_width * self.header.len() as f64
    }

    pub fn height(&self) -> f64 {
        self.header_height + self.row_height * self.rows.len() as f64
    }
}

/// Width of rendered text.
pub trait TextMeasure {
    /// Advance width of `text` in points.
    fn text_width(&self, text: &str, font: Font, size: f64) -> f64;
}

/// A document being drawn page by page. See the [module docs](self).
pub trait PageRenderer: TextMeasure {
    fn begin_page(&mut self) -> Result<(), RenderError>;

    fn draw_image(&mut self, path: &Path, rect: Rect) -> Result<(), RenderError>;

    fn draw_text(&mut self, run: &TextRun) -> Result<(), RenderError>;

    /// Rotate everything drawn until the matching `end_rotation` by
    /// `degrees` (counter-clockwise) about `center`.
    fn begin_rotation(&mut self, degrees: f64, center: (f64, f64)) -> Result<(), RenderError>;

    fn end_rotation(&mut self) -> Result<(), RenderError>;

    fn draw_table(&mut self, table: &Table) -> Result<(), RenderError>;

    /// Close the document. No instruction is accepted afterwards.
    fn finish(&mut self) -> Result<(), RenderError>;

    /// Pages begun so far.
    fn page_count(&self) -> usize;
}

/// Affine matrix `[a, b, c, d, e, f]` rotating by `degrees` about `center`.
pub(crate) fn rotation_matrix(degrees: f64, center: (f64, f64)) -> [f64; 6] {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (cx, cy) = center;
    [
        cos,
        sin,
        -sin,
        cos,
        cx - cos * cx + sin * cy,
        cy - sin * cx - cos * cy,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(m: [f64; 6], (x, y): (f64, f64)) -> (f64, f64) {
        (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
    }

    #[test]
    fn half_turn_about_center_swaps_corners() {
        let m = rotation_matrix(180.0, (5.5, 4.25));
        let (x, y) = apply(m, (0.0, 0.0));
        assert!((x - 11.0).abs() < 1e-9 && (y - 8.5).abs() < 1e-9);
        let (x, y) = apply(m, (5.5, 4.25));
        assert!((x - 5.5).abs() < 1e-9 && (y - 4.25).abs() < 1e-9);
    }

    #[test]
    fn zero_rotation_is_identity() {
        let m = rotation_matrix(0.0, (3.0, 2.0));
        let (x, y) = apply(m, (1.5, 7.0));
        assert!((x - 1.5).abs() < 1e-12 && (y - 7.0).abs() < 1e-12);
    }

    #[test]
    fn table_dimensions() {
        let t = Table {
            x: 0.5,
            top: 7.5,
            column_width: 1.0,
            header_height: 0.4,
            row_height: 1.0,
            header: vec!["S".into(); 7],
            rows: vec![vec![String::new(); 7]; 5],
            header_size: 12.0,
            cell_size: 18.0,
            text_color: Rgb::BLACK,
            line_color: Rgb::BLACK,
        };
        assert_eq!(t.width(), 7.0);
        assert!((t.height() - 5.4).abs() < 1e-12);
    }

    #[test]
    fn default_page_is_landscape_letter() {
        let p = PageSize::default();
        assert_eq!((p.width, p.height), (11.0, 8.5));
        assert_eq!(p.center(), (5.5, 4.25));
    }
}
