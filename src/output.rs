//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every photo is its calendar identity (slot number and page) with
//! filesystem paths shown as secondary context via indented `Source:`
//! lines.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Photos
//! 00 Title (lighthouse)
//!     Source: 00-lighthouse.jpg (4000x3000)
//! 01 January (snowy fields)
//!     Source: 01-snowy-fields.jpg (4000x3000)
//! ```
//!
//! ## Prepare
//!
//! ```text
//! 03 March (cherry blossom)
//!     Source: months/03-cherry-blossom.jpg
//!     normal: cached
//!     mirrored: encoded
//!     Palette: #f2c4d0 #3a5f2b #8d9a7c #e8e4de
//! ```
//!
//! ## Build
//!
//! ```text
//! normal → out/cuckoo-2027.pdf (26 pages)
//! mirrored → out/cuckoo-2027-mirror.pdf (26 pages)
//! Hidden days: 14 (displayed dates end 14 days behind)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::calendar::BuildReport;
use crate::compose::PassReport;
use crate::config::Settings;
use crate::cuckoo::CuckooEvent;
use crate::dates::month_name;
use crate::grid::{MonthGrid, WEEKDAY_HEADER};
use crate::imaging::Dimensions;
use crate::photos::{SourcePhoto, TITLE_SLOT};
use crate::prepare::{PrepareEvent, VariantStatus};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Page a slot's photo appears on.
fn slot_title(slot: u32) -> &'static str {
    if slot == TITLE_SLOT {
        "Title"
    } else {
        month_name(slot).unwrap_or("?")
    }
}

/// Format a photo header: slot, page, and caption when there is one.
///
/// ```text
/// 03 March (cherry blossom)
/// 07 July
/// ```
fn photo_line(slot: u32, caption: &str) -> String {
    if caption.is_empty() {
        format!("{:02} {}", slot, slot_title(slot))
    } else {
        format!("{:02} {} ({})", slot, slot_title(slot), caption)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: i64, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the discovered photo set with source dimensions.
pub fn format_check_output(sources: &[(SourcePhoto, Dimensions)]) -> Vec<String> {
    let mut lines = vec!["Photos".to_string()];
    for (photo, dims) in sources {
        lines.push(photo_line(photo.slot, &photo.caption));
        lines.push(format!(
            "{}Source: {} ({}x{})",
            indent(1),
            file_name(&photo.path),
            dims.width,
            dims.height
        ));
    }
    lines
}

pub fn print_check_output(sources: &[(SourcePhoto, Dimensions)]) {
    for line in format_check_output(sources) {
        println!("{}", line);
    }
}

/// Format resolved settings.
pub fn format_settings(settings: &Settings) -> Vec<String> {
    vec![
        format!("Seed: {}", settings.seed),
        format!("Year: {}", settings.year),
        format!("Subtitle: {}", settings.subtitle),
        format!("Output: {}", settings.output.display()),
        format!(
            "Cuckoo begins: {} ({})",
            settings.cuckoo_begin.format("%Y-%m-%d"),
            settings.cuckoo_phrase
        ),
    ]
}

pub fn print_settings(settings: &Settings) {
    for line in format_settings(settings) {
        println!("{}", line);
    }
}

// ============================================================================
// Prepare
// ============================================================================

/// Format a single prepare progress event as display lines.
pub fn format_prepare_event(event: &PrepareEvent) -> Vec<String> {
    match event {
        PrepareEvent::Started { photo_count } => {
            vec![format!("Preparing {} photos", photo_count)]
        }
        PrepareEvent::PhotoPrepared {
            slot,
            caption,
            source_path,
            variants,
            palette,
            palette_cached,
        } => {
            let mut lines = vec![
                photo_line(*slot, caption),
                format!("{}Source: {}", indent(1), source_path),
            ];
            for info in variants {
                let status = match info.status {
                    VariantStatus::Cached => "cached",
                    VariantStatus::Copied => "copied",
                    VariantStatus::Encoded => "encoded",
                };
                lines.push(format!("{}{}: {}", indent(1), info.variant, status));
            }
            let colors: Vec<String> = palette.colors().iter().map(|c| c.to_hex()).collect();
            let suffix = if *palette_cached { " (cached)" } else { "" };
            lines.push(format!(
                "{}Palette: {}{}",
                indent(1),
                colors.join(" "),
                suffix
            ));
            lines
        }
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Format a month grid the way the grid page shows it.
///
/// ```text
/// January 2025
///      Sun Mon Tue Wed Thu Fri Sat
///                    1   2   3   4
/// ```
pub fn format_month_grid(grid: &MonthGrid) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}",
        month_name(grid.month).unwrap_or("?"),
        grid.year
    )];
    let header: String = WEEKDAY_HEADER.iter().map(|d| format!("{:>4}", d)).collect();
    lines.push(format!("{}{}", indent(1), header));
    for row in grid.label_rows() {
        let cells: String = row.iter().map(|label| format!("{:>4}", label)).collect();
        lines.push(format!("{}{}", indent(1), cells).trim_end().to_string());
    }
    lines
}

/// Format the cuckoo event log.
pub fn format_events(events: &[CuckooEvent]) -> Vec<String> {
    let mut lines = vec![format!("Cuckoo events ({})", events.len())];
    for event in events {
        lines.push(format!(
            "{}{}  {}",
            indent(1),
            event.date.format("%Y-%m-%d"),
            event.description
        ));
    }
    lines
}

/// Format a composed pass: every month grid, then the event log.
pub fn format_plan_output(pass: &PassReport) -> Vec<String> {
    let mut lines = vec![format!("{} document, {} pages", pass.variant, pass.pages)];
    for grid in &pass.grids {
        lines.push(String::new());
        lines.extend(format_month_grid(grid));
    }
    lines.push(String::new());
    lines.extend(format_events(&pass.events));
    lines
}

pub fn print_plan_output(pass: &PassReport) {
    for line in format_plan_output(pass) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format the written documents and the cuckoo summary.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .documents
        .iter()
        .map(|doc| {
            format!(
                "{} \u{2192} {} ({} pages)",
                doc.pass.variant,
                doc.path.display(),
                doc.pass.pages
            )
        })
        .collect();
    if let Some(primary) = report.primary() {
        let hidden = primary.pass.hidden_days() as i64;
        lines.push(format!(
            "Hidden days: {} (displayed dates end {} behind)",
            hidden,
            plural(-primary.pass.final_offset, "day")
        ));
    }
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DocumentReport;
    use crate::color::{Palette, Rgb};
    use crate::grid::Cell;
    use crate::prepare::VariantInfo;
    use crate::types::Variant;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn photo_line_with_and_without_caption() {
        assert_eq!(photo_line(0, "lighthouse"), "00 Title (lighthouse)");
        assert_eq!(photo_line(3, "cherry blossom"), "03 March (cherry blossom)");
        assert_eq!(photo_line(7, ""), "07 July");
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn check_lists_photos_with_dimensions() {
        let sources = vec![(
            SourcePhoto {
                slot: 1,
                path: PathBuf::from("months/01-snowy-fields.jpg"),
                caption: "snowy fields".into(),
            },
            Dimensions {
                width: 4000,
                height: 3000,
            },
        )];
        assert_eq!(
            format_check_output(&sources),
            vec![
                "Photos",
                "01 January (snowy fields)",
                "    Source: 01-snowy-fields.jpg (4000x3000)",
            ]
        );
    }

    // =========================================================================
    // Prepare
    // =========================================================================

    #[test]
    fn format_prepare_started() {
        let lines = format_prepare_event(&PrepareEvent::Started { photo_count: 13 });
        assert_eq!(lines, vec!["Preparing 13 photos"]);
    }

    #[test]
    fn format_prepare_photo() {
        let event = PrepareEvent::PhotoPrepared {
            slot: 3,
            caption: "cherry blossom".into(),
            source_path: "months/03-cherry-blossom.jpg".into(),
            variants: vec![
                VariantInfo {
                    variant: Variant::Normal,
                    status: VariantStatus::Cached,
                },
                VariantInfo {
                    variant: Variant::Mirrored,
                    status: VariantStatus::Encoded,
                },
            ],
            palette: Palette::new(vec![Rgb(255, 0, 0), Rgb(0, 0, 255)], Rgb(128, 0, 128)),
            palette_cached: true,
        };
        assert_eq!(
            format_prepare_event(&event),
            vec![
                "03 March (cherry blossom)",
                "    Source: months/03-cherry-blossom.jpg",
                "    normal: cached",
                "    mirrored: encoded",
                "    Palette: #ff0000 #0000ff (cached)",
            ]
        );
    }

    // =========================================================================
    // Plan
    // =========================================================================

    #[test]
    fn month_grid_renders_columns() {
        let mut first = [Cell::Empty; 7];
        first[5] = Cell::Day(1);
        first[6] = Cell::Blanked;
        let grid = MonthGrid {
            year: 2025,
            month: 8,
            rows: vec![first],
            skips: 1,
            offset: -1,
        };
        assert_eq!(
            format_month_grid(&grid),
            vec![
                "August 2025",
                "     Sun Mon Tue Wed Thu Fri Sat",
                "                           1",
            ]
        );
    }

    #[test]
    fn events_are_listed_in_order() {
        let events = vec![CuckooEvent {
            date: NaiveDate::from_ymd_opt(2025, 2, 9).unwrap(),
            description: "Hid Sunday, February 9; displayed days now lag by 1 day".into(),
        }];
        assert_eq!(
            format_events(&events),
            vec![
                "Cuckoo events (1)",
                "    2025-02-09  Hid Sunday, February 9; displayed days now lag by 1 day",
            ]
        );
    }

    // =========================================================================
    // Build
    // =========================================================================

    fn pass(variant: Variant, hidden: usize) -> PassReport {
        let event = CuckooEvent {
            date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            description: String::new(),
        };
        PassReport {
            variant,
            pages: 26,
            grids: vec![],
            events: vec![event; hidden],
            final_offset: -(hidden as i64),
        }
    }

    #[test]
    fn build_output_lists_documents_and_summary() {
        let report = BuildReport {
            documents: vec![
                DocumentReport {
                    path: PathBuf::from("out/cuckoo-2025.pdf"),
                    pass: pass(Variant::Normal, 1),
                },
                DocumentReport {
                    path: PathBuf::from("out/cuckoo-2025-mirror.pdf"),
                    pass: pass(Variant::Mirrored, 1),
                },
            ],
        };
        assert_eq!(
            format_build_output(&report),
            vec![
                "normal \u{2192} out/cuckoo-2025.pdf (26 pages)",
                "mirrored \u{2192} out/cuckoo-2025-mirror.pdf (26 pages)",
                "Hidden days: 1 (displayed dates end 1 day behind)",
            ]
        );
    }

    #[test]
    fn build_summary_pluralizes() {
        let report = BuildReport {
            documents: vec![DocumentReport {
                path: PathBuf::from("cal.pdf"),
                pass: pass(Variant::Normal, 3),
            }],
        };
        assert_eq!(
            format_build_output(&report)[1],
            "Hidden days: 3 (displayed dates end 3 days behind)"
        );
    }
}
