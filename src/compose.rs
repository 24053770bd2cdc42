//! Page composition: turns settings, photos and palettes into renderer
//! instructions for one document.
//!
//! A [`PageComposer`] owns the only [`RandomStream`] and [`DayGridBuilder`]
//! of its pass, so every random draw happens here, in this fixed order:
//!
//! 1. Title page: label colors, year position, subtitle position.
//! 2. For each month: photo page (label colors, month position, optional
//!    year position), then the day grid (one skip draw per eligible row).
//! 3. Summary page: no draws.
//!
//! Both passes follow the same order from the same seed, so the normal and
//! mirrored documents carry identical labels, grids and cuckoo events. The
//! mirrored pass differs only in the photo variant and in turning month
//! photo pages a half turn about the page center.

use crate::color::{ColorDistance, ColorPair};
use crate::config::Settings;
use crate::contrast::select_colors;
use crate::cuckoo::CuckooEvent;
use crate::dates::month_name;
use crate::grid::{DayGridBuilder, GridError, MonthGrid, WEEKDAY_HEADER};
use crate::photos::{PhotoStore, StoreError, TITLE_SLOT};
use crate::placement::{
    OutlinedLabel, POINTS_PER_INCH, Placement, place_primary, place_secondary,
};
use crate::random::RandomStream;
use crate::render::{Font, PageRenderer, PageSize, Rect, RenderError, Table, TextRun};
use crate::types::Variant;
use serde::Serialize;
use thiserror::Error;

/// Degrees mirrored photo pages are turned by.
pub const MIRROR_ROTATION: f64 = 180.0;

const SUMMARY_TITLE_SIZE: f64 = 24.0;
const SUMMARY_TEXT_SIZE: f64 = 12.0;
const SUMMARY_LINE_HEIGHT: f64 = 0.25;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Photo store error: {0}")]
    Store(#[from] StoreError),
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),
}

/// What one pass produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassReport {
    pub variant: Variant,
    pub pages: usize,
    pub grids: Vec<MonthGrid>,
    pub events: Vec<CuckooEvent>,
    /// Render offset after December.
    pub final_offset: i64,
}

impl PassReport {
    pub fn hidden_days(&self) -> usize {
        self.events.len()
    }
}

pub struct PageComposer<'a> {
    settings: &'a Settings,
    store: &'a dyn PhotoStore,
    distance: &'a dyn ColorDistance,
    variant: Variant,
    stream: RandomStream,
    grid: DayGridBuilder,
}

impl<'a> PageComposer<'a> {
    /// A composer with a freshly seeded stream and a cursor on January 1.
    pub fn new(
        settings: &'a Settings,
        store: &'a dyn PhotoStore,
        distance: &'a dyn ColorDistance,
        variant: Variant,
    ) -> Result<Self, ComposeError> {
        Ok(Self {
            settings,
            store,
            distance,
            variant,
            stream: RandomStream::new(settings.seed),
            grid: DayGridBuilder::new(settings.year, settings.cuckoo_begin)?,
        })
    }

    /// Draw the whole document and finish it.
    pub fn compose(mut self, renderer: &mut dyn PageRenderer) -> Result<PassReport, ComposeError> {
        self.title_page(renderer)?;

        let mut grids = Vec::with_capacity(12);
        for month in 1..=12 {
            self.month_photo_page(renderer, month)?;
            grids.push(self.grid_page(renderer, month)?);
        }

        let final_offset = self.grid.offset();
        let events = self.grid.into_events();
        summary_page(renderer, self.settings, self.variant, &events)?;
        let pages = renderer.page_count();
        renderer.finish()?;

        Ok(PassReport {
            variant: self.variant,
            pages,
            grids,
            events,
            final_offset,
        })
    }

    fn page(&self) -> PageSize {
        self.settings.config.page
    }

    fn full_page(&self) -> Rect {
        let page = self.page();
        Rect {
            x: 0.0,
            y: 0.0,
            width: page.width,
            height: page.height,
        }
    }

    fn title_page(&mut self, renderer: &mut dyn PageRenderer) -> Result<(), ComposeError> {
        let config = &self.settings.config;
        let title = &config.title;
        let store = self.store;

        renderer.begin_page()?;
        // The title photo is never flipped: the title page stays upright in
        // both documents.
        renderer.draw_image(store.photo(TITLE_SLOT, Variant::Normal)?, self.full_page())?;

        let colors = select_colors(
            &mut self.stream,
            store.palette(TITLE_SLOT)?,
            self.distance,
            config.contrast.threshold,
            title.invert,
        );
        let primary = place_primary(&mut self.stream, &title.region);
        let secondary = place_secondary(&mut self.stream, &primary, &title.secondary.anchors());
        tracing::debug!(
            variant = %self.variant,
            x = primary.x,
            y = primary.y,
            fill = %colors.foreground,
            outline = %colors.outline,
            "title page"
        );

        let year = OutlinedLabel {
            text: self.settings.year.to_string(),
            font: Font::Bold,
            size: title.size,
            placement: primary,
            colors,
            offset: title.offset,
        };
        draw_label(renderer, &year)?;

        if !self.settings.subtitle.is_empty() {
            let subtitle = OutlinedLabel {
                text: self.settings.subtitle.clone(),
                font: Font::Regular,
                size: title.secondary.size,
                placement: secondary,
                colors,
                offset: title.secondary.offset,
            };
            draw_label(renderer, &subtitle)?;
        }
        Ok(())
    }

    fn month_photo_page(
        &mut self,
        renderer: &mut dyn PageRenderer,
        month: u32,
    ) -> Result<(), ComposeError> {
        let config = &self.settings.config;
        let store = self.store;
        let mirrored = self.variant.is_mirrored();

        renderer.begin_page()?;
        if mirrored {
            renderer.begin_rotation(MIRROR_ROTATION, self.page().center())?;
        }
        renderer.draw_image(store.photo(month, self.variant)?, self.full_page())?;

        let colors = select_colors(
            &mut self.stream,
            store.palette(month)?,
            self.distance,
            config.contrast.threshold,
            config.month.invert,
        );
        let primary = place_primary(&mut self.stream, &config.month.region);
        tracing::debug!(month, x = primary.x, y = primary.y, "month photo page");

        let name = OutlinedLabel {
            text: month_name(month).unwrap_or_default().to_string(),
            font: Font::Bold,
            size: config.month.size,
            placement: primary,
            colors,
            offset: config.month.offset,
        };
        draw_label(renderer, &name)?;

        if config.month.show_year {
            let placement =
                place_secondary(&mut self.stream, &primary, &config.month.secondary.anchors());
            self.draw_year(renderer, placement, colors)?;
        }

        if mirrored {
            renderer.end_rotation()?;
        }
        Ok(())
    }

    fn draw_year(
        &self,
        renderer: &mut dyn PageRenderer,
        placement: Placement,
        colors: ColorPair,
    ) -> Result<(), ComposeError> {
        let secondary = &self.settings.config.month.secondary;
        let label = OutlinedLabel {
            text: self.settings.year.to_string(),
            font: Font::Regular,
            size: secondary.size,
            placement,
            colors,
            offset: secondary.offset,
        };
        draw_label(renderer, &label)
    }

    fn grid_page(
        &mut self,
        renderer: &mut dyn PageRenderer,
        month: u32,
    ) -> Result<MonthGrid, ComposeError> {
        let grid = self.grid.build_month(&mut self.stream, month)?;
        let layout = &self.settings.config.grid;
        let page = self.page();

        renderer.begin_page()?;
        renderer.draw_text(&TextRun {
            text: format!(
                "{} {}",
                month_name(month).unwrap_or_default(),
                self.settings.year
            ),
            x: layout.margin,
            y: page.height - layout.margin - layout.heading_size / POINTS_PER_INCH,
            font: Font::Bold,
            size: layout.heading_size,
            color: layout.text_color,
        })?;
        renderer.draw_table(&Table {
            x: layout.margin,
            top: page.height - layout.margin - layout.heading_height,
            column_width: (page.width - 2.0 * layout.margin) / WEEKDAY_HEADER.len() as f64,
            header_height: layout.header_height,
            row_height: layout.row_height(&page),
            header: WEEKDAY_HEADER.iter().map(|d| d.to_string()).collect(),
            rows: grid.label_rows(),
            header_size: layout.header_size,
            cell_size: layout.cell_size,
            text_color: layout.text_color,
            line_color: layout.line_color,
        })?;

        tracing::debug!(
            month,
            rows = grid.rows.len(),
            skips = grid.skips,
            offset = grid.offset,
            "day grid"
        );
        Ok(grid)
    }
}

fn draw_label(renderer: &mut dyn PageRenderer, label: &OutlinedLabel) -> Result<(), ComposeError> {
    for run in label.draw_runs(&*renderer) {
        renderer.draw_text(&run)?;
    }
    Ok(())
}

/// Configuration echo and the cuckoo event log. Spills onto further pages
/// when the log is long.
fn summary_page(
    renderer: &mut dyn PageRenderer,
    settings: &Settings,
    variant: Variant,
    events: &[CuckooEvent],
) -> Result<(), ComposeError> {
    let layout = &settings.config.grid;
    let page = settings.config.page;
    let top = page.height - layout.margin - SUMMARY_TITLE_SIZE / POINTS_PER_INCH;

    renderer.begin_page()?;
    renderer.draw_text(&TextRun {
        text: format!("Cuckoo Calendar {}", settings.year),
        x: layout.margin,
        y: top,
        font: Font::Bold,
        size: SUMMARY_TITLE_SIZE,
        color: layout.text_color,
    })?;

    let mut lines = vec![
        format!("Seed: {}", settings.seed),
        format!("Year: {}", settings.year),
        format!("Subtitle: {}", settings.subtitle),
        format!("Output: {}", settings.output.display()),
        format!(
            "Cuckoo begins: {} ({})",
            settings.cuckoo_begin.format("%B %-d, %Y"),
            settings.cuckoo_phrase
        ),
        format!("Variant: {variant}"),
        format!("Hidden days: {}", events.len()),
        String::new(),
    ];
    lines.extend(
        events
            .iter()
            .map(|e| format!("{}  {}", e.date.format("%Y-%m-%d"), e.description)),
    );

    let mut y = top - 2.0 * SUMMARY_LINE_HEIGHT;
    for line in lines {
        if y < layout.margin {
            renderer.begin_page()?;
            y = page.height - layout.margin - SUMMARY_TEXT_SIZE / POINTS_PER_INCH;
        }
        if !line.is_empty() {
            renderer.draw_text(&TextRun {
                text: line,
                x: layout.margin,
                y,
                font: Font::Regular,
                size: SUMMARY_TEXT_SIZE,
                color: layout.text_color,
            })?;
        }
        y -= SUMMARY_LINE_HEIGHT;
    }
    Ok(())
}
