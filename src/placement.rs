//! Randomized label placement and the outlined-text draw plan.
//!
//! All coordinates are inches from the bottom-left corner of the page, y
//! growing upward, and refer to the text baseline origin.
//!
//! - The **primary** label (the year on the title page, the month name on
//!   a photo page) lands uniformly inside its page's safe [`Region`].
//! - A **secondary** label (the subtitle) is anchored to the left or right
//!   margin at a random height, and must sit further than a minimum
//!   Manhattan distance from the primary. Candidates are drawn until one
//!   qualifies, up to [`MAX_PLACEMENT_ATTEMPTS`]; past that a deterministic
//!   corner fallback guarantees termination.
//!
//! The renderer has no stroke support, so [`OutlinedLabel::draw_runs`]
//! fakes an outline by drawing the text four times, offset diagonally by
//! `±offset`, in the outline color, then once on top in the foreground.

use crate::color::ColorPair;
use crate::random::RandomStream;
use crate::render::{Font, TextMeasure, TextRun};
use serde::{Deserialize, Serialize};

/// Rejection-sampling budget for secondary placement.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Right,
}

/// Axis-aligned box, in inches, that a primary label origin must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Region {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Region {
    pub fn is_ordered(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }
}

/// Margin anchors and spacing rule for a secondary label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecondaryAnchors {
    /// x of the left-aligned candidate.
    pub left_x: f64,
    /// x of the right-aligned candidate; the text's right edge lands here.
    pub right_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    /// Required Manhattan distance (exclusive) from the primary label.
    pub min_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub alignment: Alignment,
}

impl Placement {
    pub fn manhattan(&self, other: &Placement) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Uniform position inside `region`. Consumes two draws (x, then y).
pub fn place_primary(stream: &mut RandomStream, region: &Region) -> Placement {
    let x = stream.uniform(region.min_x, region.max_x);
    let y = stream.uniform(region.min_y, region.max_y);
    Placement {
        x,
        y,
        alignment: Alignment::Left,
    }
}

/// Margin-anchored position far enough from `primary`.
pub fn place_secondary(
    stream: &mut RandomStream,
    primary: &Placement,
    anchors: &SecondaryAnchors,
) -> Placement {
    let sides = [
        (anchors.left_x, Alignment::Left),
        (anchors.right_x, Alignment::Right),
    ];

    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let (x, alignment) = stream
            .choice(&sides)
            .copied()
            .unwrap_or((anchors.left_x, Alignment::Left));
        let y = stream.uniform(anchors.min_y, anchors.max_y);
        let candidate = Placement { x, y, alignment };
        if candidate.manhattan(primary) > anchors.min_distance {
            return candidate;
        }
    }

    let fallback = farthest_corner(primary, anchors);
    tracing::warn!(
        attempts = MAX_PLACEMENT_ATTEMPTS,
        min_distance = anchors.min_distance,
        x = fallback.x,
        y = fallback.y,
        "secondary label could not be spaced from primary, using farthest corner"
    );
    fallback
}

/// The anchor corner with the largest Manhattan distance from `primary`.
/// Ties resolve to the earlier corner in left-bottom, left-top,
/// right-bottom, right-top order.
fn farthest_corner(primary: &Placement, anchors: &SecondaryAnchors) -> Placement {
    let corners = [
        Placement {
            x: anchors.left_x,
            y: anchors.min_y,
            alignment: Alignment::Left,
        },
        Placement {
            x: anchors.left_x,
            y: anchors.max_y,
            alignment: Alignment::Left,
        },
        Placement {
            x: anchors.right_x,
            y: anchors.min_y,
            alignment: Alignment::Right,
        },
        Placement {
            x: anchors.right_x,
            y: anchors.max_y,
            alignment: Alignment::Right,
        },
    ];
    let mut best = corners[0];
    for corner in &corners[1..] {
        if corner.manhattan(primary) > best.manhattan(primary) {
            best = *corner;
        }
    }
    best
}

/// A label with everything needed to draw it with a fake outline.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlinedLabel {
    pub text: String,
    pub font: Font,
    /// Font size in points.
    pub size: f64,
    pub placement: Placement,
    pub colors: ColorPair,
    /// Outline offset δ in inches.
    pub offset: f64,
}

impl OutlinedLabel {
    /// x of the text origin after right-alignment compensation.
    pub fn origin_x<M: TextMeasure + ?Sized>(&self, measure: &M) -> f64 {
        match self.placement.alignment {
            Alignment::Left => self.placement.x,
            Alignment::Right => {
                let width_pt = measure.text_width(&self.text, self.font, self.size);
                self.placement.x - width_pt / POINTS_PER_INCH
            }
        }
    }

    /// Four outline runs (diagonal offsets) followed by the foreground run.
    pub fn draw_runs<M: TextMeasure + ?Sized>(&self, measure: &M) -> Vec<TextRun> {
        let x = self.origin_x(measure);
        let y = self.placement.y;
        let d = self.offset;
        let run = |x: f64, y: f64, color| TextRun {
            text: self.text.clone(),
            x,
            y,
            font: self.font,
            size: self.size,
            color,
        };

        vec![
            run(x - d, y - d, self.colors.outline),
            run(x - d, y + d, self.colors.outline),
            run(x + d, y - d, self.colors.outline),
            run(x + d, y + d, self.colors.outline),
            run(x, y, self.colors.foreground),
        ]
    }
}
