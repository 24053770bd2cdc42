//! PDF output via `pdf-writer`.
//!
//! Text uses the standard Helvetica faces (not embedded, WinAnsiEncoding).
//! Images are embedded once per distinct path: JPEG RGB files pass through
//! untouched as DCT streams, anything else is decoded and re-encoded as
//! JPEG. Page content streams are zlib-compressed.

use super::metrics::{HelveticaMetrics, encode_win_ansi};
use super::{
    Font, PageRenderer, PageSize, Rect, RenderError, Table, TextMeasure, TextRun, rotation_matrix,
};
use crate::placement::POINTS_PER_INCH;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use pdf_writer::{Content, Filter, Name, Pdf, Ref, Str};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const REGULAR_FONT: &[u8] = b"F1";
const BOLD_FONT: &[u8] = b"F2";
const REENCODE_QUALITY: u8 = 92;
const TABLE_LINE_WIDTH: f32 = 0.75;
/// Inset of a day number from its cell's top-left corner, inches.
const CELL_PADDING: f64 = 0.08;

fn pt(inches: f64) -> f32 {
    (inches * POINTS_PER_INCH) as f32
}

fn font_name(font: Font) -> Name<'static> {
    match font {
        Font::Regular => Name(REGULAR_FONT),
        Font::Bold => Name(BOLD_FONT),
    }
}

/// Renders pages into a PDF written to `path` on [`finish`](PageRenderer::finish).
pub struct PdfRenderer {
    path: PathBuf,
    page_size: PageSize,
    pdf: Pdf,
    next_id: i32,
    catalog_id: Ref,
    pages_id: Ref,
    regular_font_id: Ref,
    bold_font_id: Ref,
    finished_pages: Vec<Content>,
    current: Option<Content>,
    image_xobjects: Vec<(String, Ref)>,
    embedded: HashMap<PathBuf, String>,
    rotation_depth: usize,
    finished: bool,
    /// Pages written by `finish`.
    written_pages: usize,
}

impl PdfRenderer {
    pub fn new(path: impl Into<PathBuf>, page_size: PageSize) -> Self {
        let mut pdf = Pdf::new();
        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let regular_font_id = Ref::new(3);
        let bold_font_id = Ref::new(4);

        pdf.type1_font(regular_font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_font_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        Self {
            path: path.into(),
            page_size,
            pdf,
            next_id: 5,
            catalog_id,
            pages_id,
            regular_font_id,
            bold_font_id,
            finished_pages: Vec::new(),
            current: None,
            image_xobjects: Vec::new(),
            embedded: HashMap::new(),
            rotation_depth: 0,
            finished: false,
            written_pages: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn alloc(&mut self) -> Ref {
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn content(&mut self) -> Result<&mut Content, RenderError> {
        if self.finished {
            return Err(RenderError::Finished);
        }
        self.current.as_mut().ok_or(RenderError::NoPage)
    }

    /// Embed `path` as an image XObject (once) and return its resource name.
    fn embed_image(&mut self, path: &Path) -> Result<String, RenderError> {
        if let Some(name) = self.embedded.get(path) {
            return Ok(name.clone());
        }

        let image_err = |reason: String| RenderError::Image {
            path: path.display().to_string(),
            reason,
        };
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader.format();
        let img = reader.decode().map_err(|e| image_err(e.to_string()))?;
        let (width, height) = (img.width(), img.height());

        let data = if format == Some(ImageFormat::Jpeg) && img.color() == ColorType::Rgb8 {
            std::fs::read(path)?
        } else {
            let mut buf = Vec::new();
            let encoder = JpegEncoder::new_with_quality(&mut buf, REENCODE_QUALITY);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| image_err(e.to_string()))?;
            buf
        };

        let id = self.alloc();
        let name = format!("Im{}", self.image_xobjects.len() + 1);
        {
            let mut xobj = self.pdf.image_xobject(id, &data);
            xobj.filter(Filter::DctDecode);
            xobj.width(width as i32);
            xobj.height(height as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
        }
        tracing::debug!(path = %path.display(), name = %name, width, height, "embedded image");

        self.image_xobjects.push((name.clone(), id));
        self.embedded.insert(path.to_path_buf(), name.clone());
        Ok(name)
    }

    fn close_current_page(&mut self) {
        if let Some(content) = self.current.take() {
            self.finished_pages.push(content);
        }
    }
}

impl TextMeasure for PdfRenderer {
    fn text_width(&self, text: &str, font: Font, size: f64) -> f64 {
        HelveticaMetrics.text_width(text, font, size)
    }
}

impl PageRenderer for PdfRenderer {
    fn begin_page(&mut self) -> Result<(), RenderError> {
        if self.finished {
            return Err(RenderError::Finished);
        }
        if self.rotation_depth != 0 {
            return Err(RenderError::UnbalancedRotation);
        }
        self.close_current_page();
        self.current = Some(Content::new());
        Ok(())
    }

    fn draw_image(&mut self, path: &Path, rect: Rect) -> Result<(), RenderError> {
        self.content()?;
        let name = self.embed_image(path)?;
        let content = self.content()?;
        content.save_state();
        content.transform([
            pt(rect.width),
            0.0,
            0.0,
            pt(rect.height),
            pt(rect.x),
            pt(rect.y),
        ]);
        content.x_object(Name(name.as_bytes()));
        content.restore_state();
        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun) -> Result<(), RenderError> {
        let bytes = encode_win_ansi(&run.text);
        let content = self.content()?;
        let (r, g, b) = run.color.to_unit();
        content.set_fill_rgb(r, g, b);
        content
            .begin_text()
            .set_font(font_name(run.font), run.size as f32)
            .next_line(pt(run.x), pt(run.y))
            .show(Str(&bytes))
            .end_text();
        Ok(())
    }

    fn begin_rotation(&mut self, degrees: f64, center: (f64, f64)) -> Result<(), RenderError> {
        let content = self.content()?;
        let m = rotation_matrix(degrees, center);
        content.save_state();
        content.transform([
            m[0] as f32,
            m[1] as f32,
            m[2] as f32,
            m[3] as f32,
            pt(m[4]),
            pt(m[5]),
        ]);
        self.rotation_depth += 1;
        Ok(())
    }

    fn end_rotation(&mut self) -> Result<(), RenderError> {
        if self.rotation_depth == 0 {
            return Err(RenderError::UnbalancedRotation);
        }
        self.content()?.restore_state();
        self.rotation_depth -= 1;
        Ok(())
    }

    fn draw_table(&mut self, table: &Table) -> Result<(), RenderError> {
        let header_widths: Vec<f64> = table
            .header
            .iter()
            .map(|h| self.text_width(h, Font::Bold, table.header_size))
            .collect();
        let content = self.content()?;

        let left = table.x;
        let right = table.x + table.width();
        let top = table.top;
        let bottom = table.top - table.height();

        let (r, g, b) = table.line_color.to_unit();
        content.set_stroke_rgb(r, g, b);
        content.set_line_width(TABLE_LINE_WIDTH);
        let mut y = top;
        content.move_to(pt(left), pt(y));
        content.line_to(pt(right), pt(y));
        y -= table.header_height;
        for _ in 0..=table.rows.len() {
            content.move_to(pt(left), pt(y));
            content.line_to(pt(right), pt(y));
            y -= table.row_height;
        }
        for col in 0..=table.header.len() {
            let x = left + table.column_width * col as f64;
            content.move_to(pt(x), pt(top));
            content.line_to(pt(x), pt(bottom));
        }
        content.stroke();

        let (r, g, b) = table.text_color.to_unit();
        content.set_fill_rgb(r, g, b);

        let header_baseline =
            top - table.header_height / 2.0 - 0.35 * table.header_size / POINTS_PER_INCH;
        for (col, (label, width_pt)) in table.header.iter().zip(&header_widths).enumerate() {
            let x = left
                + table.column_width * col as f64
                + (table.column_width - width_pt / POINTS_PER_INCH) / 2.0;
            content
                .begin_text()
                .set_font(Name(BOLD_FONT), table.header_size as f32)
                .next_line(pt(x), pt(header_baseline))
                .show(Str(&encode_win_ansi(label)))
                .end_text();
        }

        let ascent = 0.75 * table.cell_size / POINTS_PER_INCH;
        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_top = top - table.header_height - table.row_height * row_idx as f64;
            let baseline = row_top - CELL_PADDING - ascent;
            for (col, cell) in row.iter().enumerate().filter(|(_, c)| !c.is_empty()) {
                let x = left + table.column_width * col as f64 + CELL_PADDING;
                content
                    .begin_text()
                    .set_font(Name(REGULAR_FONT), table.cell_size as f32)
                    .next_line(pt(x), pt(baseline))
                    .show(Str(&encode_win_ansi(cell)))
                    .end_text();
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        if self.finished {
            return Err(RenderError::Finished);
        }
        if self.rotation_depth != 0 {
            return Err(RenderError::UnbalancedRotation);
        }
        self.close_current_page();
        self.finished = true;

        let pages = std::mem::take(&mut self.finished_pages);
        let n = pages.len();
        self.written_pages = n;
        let page_ids: Vec<Ref> = (0..n).map(|_| self.alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| self.alloc()).collect();

        for (content, id) in pages.into_iter().zip(&content_ids) {
            let raw = content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            self.pdf.stream(*id, &compressed).filter(Filter::FlateDecode);
        }

        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.pdf
            .pages(self.pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        let media_box = pdf_writer::Rect::new(
            0.0,
            0.0,
            pt(self.page_size.width),
            pt(self.page_size.height),
        );
        for (page_id, content_id) in page_ids.iter().zip(&content_ids) {
            let mut page = self.pdf.page(*page_id);
            page.media_box(media_box)
                .parent(self.pages_id)
                .contents(*content_id);
            let mut resources = page.resources();
            resources
                .fonts()
                .pair(Name(REGULAR_FONT), self.regular_font_id)
                .pair(Name(BOLD_FONT), self.bold_font_id);
            if !self.image_xobjects.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, id) in &self.image_xobjects {
                    xobjects.pair(Name(name.as_bytes()), *id);
                }
            }
        }

        let bytes = std::mem::replace(&mut self.pdf, Pdf::new()).finish();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, &bytes)?;
        tracing::info!(path = %self.path.display(), pages = n, bytes = bytes.len(), "wrote PDF");
        Ok(())
    }

    fn page_count(&self) -> usize {
        if self.finished {
            return self.written_pages;
        }
        self.finished_pages.len() + usize::from(self.current.is_some())
    }
}
