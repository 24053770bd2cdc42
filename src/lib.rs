//! # Cuckoo Calendar
//!
//! A seeded generator for printable photo wall calendars. Thirteen photos
//! go in; a PDF comes out with a title page, a photo page and a day grid per
//! month, and a summary page. Somewhere after a configured date, the cuckoo
//! starts hiding days: each hidden day blanks one grid cell and pushes every
//! later displayed date one day further behind the real one.
//!
//! # Architecture: Two Stages
//!
//! ```text
//! 1. Prepare   months/   →  prepared/manifest.json   (crop, flip, palettes)
//! 2. Build     prepared  →  cuckoo-2027.pdf          (normal pass)
//!                        →  cuckoo-2027-mirror.pdf   (mirrored pass)
//! ```
//!
//! Preparation is the only expensive, parallel step and is cached by
//! content hash. Building is single-threaded, deterministic, and fast.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`random`] | Seeded random stream; every layout decision draws from it |
//! | [`color`] | `Rgb`, palettes, CIEDE2000 distance |
//! | [`contrast`] | Picks a legible fill/outline pair from a palette |
//! | [`placement`] | Label positions and the outlined-text draw plan |
//! | [`dates`] | Month names and the relative date phrase parser |
//! | [`cuckoo`] | Skip decisions, render offset, event log |
//! | [`grid`] | Day cursor and Sunday-first week rows |
//! | [`compose`] | Drives all of the above, page by page, into a renderer |
//! | [`render`] | `PageRenderer` trait, PDF writer, recording renderer |
//! | [`calendar`] | Runs the normal and mirrored passes |
//! | [`photos`] | Photo discovery and the `PhotoStore` contract |
//! | [`naming`] | `NN-name` photo filename convention |
//! | [`prepare`] | Parallel photo preparation, the production `PhotoStore` |
//! | [`cache`] | Content-addressed cache for prepared photos and palettes |
//! | [`imaging`] | Pure-Rust image operations: resize-to-fill, flip, median cut |
//! | [`config`] | `calendar.toml` loading, validation, merging, resolved settings |
//! | [`types`] | Shared types (`Variant`) |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## One Stream Per Pass
//!
//! A pass owns exactly one [`random::RandomStream`] and one
//! [`grid::DayGridBuilder`]; nothing random or stateful lives in a global.
//! The normal and mirrored passes are built from the same seed in the same
//! draw order, so the two documents agree on every label, grid and hidden
//! day even though they are composed independently.
//!
//! ## Collaborators Behind Traits
//!
//! The composer reaches photos through [`photos::PhotoStore`], compares
//! colors through [`color::ColorDistance`] and draws through
//! [`render::PageRenderer`]. Tests swap in fixed stores, a Euclidean metric
//! and a recording renderer, so page composition is tested without
//! decoding a single image or writing a PDF.
//!
//! ## Bounded Placement
//!
//! Subtitle placement retries until it is far enough from the year, but
//! never more than [`placement::MAX_PLACEMENT_ATTEMPTS`] times. A layout
//! that cannot be satisfied falls back to the farthest margin corner and
//! logs a warning instead of hanging.
//!
//! ## Pure-Rust Imaging and PDF
//!
//! Photos are decoded and encoded with the `image` crate and documents are
//! written with `pdf-writer` using the standard Helvetica faces, so the
//! binary has no system dependencies and embeds no font files.

pub mod cache;
pub mod calendar;
pub mod color;
pub mod compose;
pub mod config;
pub mod contrast;
pub mod cuckoo;
pub mod dates;
pub mod grid;
pub mod imaging;
pub mod logging;
pub mod naming;
pub mod output;
pub mod photos;
pub mod placement;
pub mod prepare;
pub mod random;
pub mod render;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
