//! Calendar configuration.
//!
//! Handles loading, validating, and merging `calendar.toml`, and resolving
//! the final [`Settings`] a build runs with. Precedence, lowest first:
//!
//! ```text
//! stock defaults  →  calendar.toml  →  environment / CLI flags
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # seed = 1735689600          # Default: current UNIX time
//! # year = 2027                # Default: next calendar year
//! subtitle = "A Cuckoo Calendar"
//! # output = "out/cuckoo-2027.pdf"  # Default: out/cuckoo-{year}.pdf
//!
//! [cuckoo]
//! begin = "in 1 month"        # Relative to January 1 of the year
//!
//! [page]
//! width = 11.0                # Inches
//! height = 8.5
//!
//! [photos]
//! width = 3300                # Prepared pixel size
//! height = 2550
//! quality = 90
//! title_palette = 3
//! month_palette = 4
//!
//! [contrast]
//! threshold = 20.0            # CIEDE2000 ΔE between fill and outline
//!
//! [processing]
//! max_processes = 4           # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! The `[title]`, `[month]` and `[grid]` sections tune label sizes,
//! placement regions and the day grid; `cuckoo-calendar gen-config` prints
//! them all with explanations.
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::color::Rgb;
use crate::contrast::DEFAULT_THRESHOLD;
use crate::dates::{DateParseError, parse_relative};
use crate::placement::{Region, SecondaryAnchors};
use crate::render::PageSize;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "calendar.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid cuckoo begin date: {0}")]
    Date(#[from] DateParseError),
}

/// Calendar configuration loaded from `calendar.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    /// Random seed. Absent means "use the current time".
    pub seed: Option<u64>,
    /// Calendar year. Absent means "next year".
    pub year: Option<i32>,
    /// Secondary text on the title page.
    pub subtitle: String,
    /// Primary document path. Absent means `out/cuckoo-{year}.pdf`.
    pub output: Option<String>,
    pub cuckoo: CuckooConfig,
    pub page: PageSize,
    pub photos: PhotosConfig,
    pub contrast: ContrastConfig,
    pub title: TitleConfig,
    pub month: MonthConfig,
    pub grid: GridConfig,
    pub processing: ProcessingConfig,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            seed: None,
            year: None,
            subtitle: "A Cuckoo Calendar".to_string(),
            output: None,
            cuckoo: CuckooConfig::default(),
            page: PageSize::default(),
            photos: PhotosConfig::default(),
            contrast: ContrastConfig::default(),
            title: TitleConfig::default(),
            month: MonthConfig::default(),
            grid: GridConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

fn check_region(name: &str, region: &Region) -> Result<(), ConfigError> {
    if !region.is_ordered() {
        return Err(invalid(format!(
            "{name}: min_x/min_y must not exceed max_x/max_y"
        )));
    }
    Ok(())
}

fn check_anchors(name: &str, anchors: &SecondaryAnchors) -> Result<(), ConfigError> {
    if anchors.min_y > anchors.max_y {
        return Err(invalid(format!("{name}: min_y must not exceed max_y")));
    }
    if anchors.min_distance < 0.0 {
        return Err(invalid(format!("{name}: min_distance must be non-negative")));
    }
    Ok(())
}

fn check_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(invalid(format!("{name} must be positive")));
    }
    Ok(())
}

impl CalendarConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(year) = self.year {
            validate_year(year)?;
        }
        if let Some(output) = &self.output {
            validate_output(Path::new(output))?;
        }
        check_positive("page.width", self.page.width)?;
        check_positive("page.height", self.page.height)?;
        if self.photos.width == 0 || self.photos.height == 0 {
            return Err(invalid("photos.width and photos.height must be non-zero"));
        }
        if !(1..=100).contains(&self.photos.quality) {
            return Err(invalid("photos.quality must be 1-100"));
        }
        if self.photos.title_palette == 0 || self.photos.month_palette == 0 {
            return Err(invalid("photos palette sizes must be at least 1"));
        }
        if self.contrast.threshold < 0.0 {
            return Err(invalid("contrast.threshold must be non-negative"));
        }
        check_positive("title.size", self.title.size)?;
        check_positive("title.secondary.size", self.title.secondary.size)?;
        check_positive("month.size", self.month.size)?;
        check_positive("month.secondary.size", self.month.secondary.size)?;
        check_region("title.region", &self.title.region)?;
        check_region("month.region", &self.month.region)?;
        check_anchors("title.secondary", &self.title.secondary.anchors())?;
        check_anchors("month.secondary", &self.month.secondary.anchors())?;
        self.grid.validate(&self.page)?;
        Ok(())
    }
}

/// Years the calendar arithmetic supports.
pub fn validate_year(year: i32) -> Result<(), ConfigError> {
    if !(1..=9999).contains(&year) {
        return Err(invalid(format!("year must be 1-9999, got {year}")));
    }
    Ok(())
}

/// The primary document must be a `.pdf` (any case).
pub fn validate_output(path: &Path) -> Result<(), ConfigError> {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(invalid(format!(
            "output must end in .pdf: {}",
            path.display()
        )));
    }
    Ok(())
}

/// When the cuckoo starts hiding days.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CuckooConfig {
    /// Relative date phrase, resolved against January 1 of the year.
    pub begin: String,
}

impl Default for CuckooConfig {
    fn default() -> Self {
        Self {
            begin: "in 1 month".to_string(),
        }
    }
}

/// Prepared photo settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotosConfig {
    /// Prepared photo width in pixels. Photos are cropped to fill.
    pub width: u32,
    pub height: u32,
    /// JPEG quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Palette size for the title photo.
    pub title_palette: usize,
    /// Palette size for month photos.
    pub month_palette: usize,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            width: 3300,
            height: 2550,
            quality: 90,
            title_palette: 3,
            month_palette: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContrastConfig {
    /// Minimum perceptual distance (exclusive) between fill and outline.
    pub threshold: f64,
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// A secondary label: text style plus margin anchors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecondaryConfig {
    /// Font size in points.
    pub size: f64,
    /// Outline offset in inches.
    pub offset: f64,
    pub left_x: f64,
    pub right_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    /// Required Manhattan distance (exclusive) from the primary label.
    pub min_distance: f64,
}

impl SecondaryConfig {
    pub fn anchors(&self) -> SecondaryAnchors {
        SecondaryAnchors {
            left_x: self.left_x,
            right_x: self.right_x,
            min_y: self.min_y,
            max_y: self.max_y,
            min_distance: self.min_distance,
        }
    }
}

/// Title page: year (primary) and subtitle (secondary).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TitleConfig {
    /// Year font size in points.
    pub size: f64,
    /// Year outline offset in inches.
    pub offset: f64,
    /// Draw the label in the inverse of a palette color.
    pub invert: bool,
    pub region: Region,
    pub secondary: SecondaryConfig,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            size: 120.0,
            offset: 0.014,
            invert: true,
            region: Region {
                min_x: 0.75,
                max_x: 6.5,
                min_y: 0.75,
                max_y: 6.5,
            },
            secondary: SecondaryConfig {
                size: 28.0,
                offset: 0.008,
                left_x: 0.75,
                right_x: 10.25,
                min_y: 0.75,
                max_y: 7.5,
                min_distance: 8.0,
            },
        }
    }
}

/// Month photo pages: month name (primary) and optional year (secondary).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonthConfig {
    pub size: f64,
    pub offset: f64,
    pub invert: bool,
    /// Also print the year, placed like the title page subtitle.
    pub show_year: bool,
    pub region: Region,
    pub secondary: SecondaryConfig,
}

impl Default for MonthConfig {
    fn default() -> Self {
        Self {
            size: 72.0,
            offset: 0.012,
            invert: false,
            show_year: false,
            region: Region {
                min_x: 0.75,
                max_x: 5.5,
                min_y: 0.75,
                max_y: 7.0,
            },
            secondary: SecondaryConfig {
                size: 28.0,
                offset: 0.008,
                left_x: 0.75,
                right_x: 10.25,
                min_y: 0.75,
                max_y: 7.5,
                min_distance: 7.0,
            },
        }
    }
}

/// Day-grid page layout. Lengths in inches, sizes in points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub margin: f64,
    /// Space reserved for the "Month Year" heading.
    pub heading_height: f64,
    pub heading_size: f64,
    pub header_height: f64,
    pub header_size: f64,
    pub cell_size: f64,
    /// Rows the table height is divided into, whatever the month needs.
    pub rows: usize,
    pub text_color: Rgb,
    pub line_color: Rgb,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            margin: 0.5,
            heading_height: 1.0,
            heading_size: 36.0,
            header_height: 0.4,
            header_size: 14.0,
            cell_size: 18.0,
            rows: 6,
            text_color: Rgb::BLACK,
            line_color: Rgb(128, 128, 128),
        }
    }
}

impl GridConfig {
    fn validate(&self, page: &PageSize) -> Result<(), ConfigError> {
        if self.rows < 6 {
            return Err(invalid("grid.rows must be at least 6"));
        }
        check_positive("grid.heading_size", self.heading_size)?;
        check_positive("grid.header_size", self.header_size)?;
        check_positive("grid.cell_size", self.cell_size)?;
        let used = 2.0 * self.margin + self.heading_height + self.header_height;
        if self.margin < 0.0 || used >= page.height || 2.0 * self.margin >= page.width {
            return Err(invalid("grid margins and headings leave no room for the table"));
        }
        Ok(())
    }

    /// Height of one week row on a page of the given size.
    pub fn row_height(&self, page: &PageSize) -> f64 {
        let body = page.height - 2.0 * self.margin - self.heading_height - self.header_height;
        body / self.rows as f64
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel photo preparation workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CalendarConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CalendarConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CalendarConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults if it is absent.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<CalendarConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

// =============================================================================
// Resolved settings
// =============================================================================

/// Highest-precedence values, from the environment or command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub year: Option<i32>,
    pub output: Option<PathBuf>,
    pub subtitle: Option<String>,
    pub cuckoo_begin: Option<String>,
}

/// The moment a build is started; source of the seed and year defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Now {
    pub timestamp: u64,
    pub year: i32,
}

impl Now {
    pub fn current() -> Self {
        let now = chrono::Local::now();
        Self {
            timestamp: u64::try_from(now.timestamp()).unwrap_or(0),
            year: now.year(),
        }
    }
}

/// Everything one build needs, with every default resolved and checked.
#[derive(Debug, Clone)]
pub struct Settings {
    pub seed: u64,
    pub year: i32,
    pub subtitle: String,
    /// Primary document; the mirrored one sits next to it.
    pub output: PathBuf,
    pub cuckoo_phrase: String,
    pub cuckoo_begin: NaiveDate,
    pub config: CalendarConfig,
}

impl Settings {
    /// Apply `overrides` over `config`, fill the remaining gaps from `now`,
    /// and validate.
    pub fn resolve(
        config: CalendarConfig,
        overrides: Overrides,
        now: Now,
    ) -> Result<Self, ConfigError> {
        let seed = overrides.seed.or(config.seed).unwrap_or(now.timestamp);
        let year = overrides.year.or(config.year).unwrap_or(now.year + 1);
        validate_year(year)?;

        let output = overrides
            .output
            .or_else(|| config.output.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| default_output(year));
        validate_output(&output)?;

        let subtitle = overrides
            .subtitle
            .unwrap_or_else(|| config.subtitle.clone());
        let cuckoo_phrase = overrides
            .cuckoo_begin
            .unwrap_or_else(|| config.cuckoo.begin.clone());
        let jan_first = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| invalid(format!("year {year} has no January 1")))?;
        let cuckoo_begin = parse_relative(&cuckoo_phrase, jan_first)?;

        Ok(Self {
            seed,
            year,
            subtitle,
            output,
            cuckoo_phrase,
            cuckoo_begin,
            config,
        })
    }
}

/// `out/cuckoo-{year}.pdf`
pub fn default_output(year: i32) -> PathBuf {
    Path::new("out").join(format!("cuckoo-{year}.pdf"))
}

/// Returns a fully-commented stock `calendar.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Cuckoo Calendar Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Environment variables and command-line flags (SEED, YEAR, OUT_FILE,
# SUBTITLE, CUCKOO_BEGIN) take precedence over this file.
# Unknown keys will cause an error.

# Random seed. Omit to use the current UNIX time.
# seed = 1735689600

# Calendar year. Omit to use next year.
# year = 2027

# Text placed on the title page next to the year.
subtitle = "A Cuckoo Calendar"

# Primary document path. Must end in .pdf. The mirrored document is written
# next to it as <name>-mirror.pdf. Omit for out/cuckoo-<year>.pdf.
# output = "out/cuckoo-2027.pdf"

# ---------------------------------------------------------------------------
# Cuckoo
# ---------------------------------------------------------------------------
[cuckoo]
# From this date on, each week row has a 1 in 3 chance of hiding a day.
# Relative to January 1 of the year: "in 1 month", "march 15", "in 6 weeks",
# or an ISO date like "2027-04-01".
begin = "in 1 month"

# ---------------------------------------------------------------------------
# Page size in inches (default: US Letter, landscape)
# ---------------------------------------------------------------------------
[page]
width = 11.0
height = 8.5

# ---------------------------------------------------------------------------
# Photo preparation
# ---------------------------------------------------------------------------
[photos]
# Pixel size photos are cropped and resized to.
width = 3300
height = 2550

# JPEG quality of prepared photos (1 = worst, 100 = best).
quality = 90

# Number of dominant colors extracted per photo.
title_palette = 3
month_palette = 4

# ---------------------------------------------------------------------------
# Label legibility
# ---------------------------------------------------------------------------
[contrast]
# Minimum CIEDE2000 distance between a label's fill and outline colors.
threshold = 20.0

# ---------------------------------------------------------------------------
# Title page
# ---------------------------------------------------------------------------
[title]
# Year label: font size (points) and outline offset (inches).
size = 120.0
offset = 0.014

# Draw the year in the inverse of a photo color.
invert = true

# Box the year's baseline origin is placed in (inches from bottom-left).
[title.region]
min_x = 0.75
max_x = 6.5
min_y = 0.75
max_y = 6.5

# Subtitle: anchored to the left or right margin, at least min_distance
# (Manhattan, inches) away from the year.
[title.secondary]
size = 28.0
offset = 0.008
left_x = 0.75
right_x = 10.25
min_y = 0.75
max_y = 7.5
min_distance = 8.0

# ---------------------------------------------------------------------------
# Month photo pages
# ---------------------------------------------------------------------------
[month]
size = 72.0
offset = 0.012
invert = false

# Also print the year on each month photo.
show_year = false

[month.region]
min_x = 0.75
max_x = 5.5
min_y = 0.75
max_y = 7.0

[month.secondary]
size = 28.0
offset = 0.008
left_x = 0.75
right_x = 10.25
min_y = 0.75
max_y = 7.5
min_distance = 7.0

# ---------------------------------------------------------------------------
# Day grid pages
# ---------------------------------------------------------------------------
[grid]
margin = 0.5
heading_height = 1.0
heading_size = 36.0
header_height = 0.4
header_size = 14.0
cell_size = 18.0
rows = 6
text_color = [0, 0, 0]
line_color = [128, 128, 128]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel photo-preparation workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
