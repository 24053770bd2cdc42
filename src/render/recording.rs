//! In-memory renderer that records every instruction.
//!
//! Used by `cuckoo-calendar plan` to show what a build would draw without
//! writing a PDF, and by tests to assert on page composition.

use super::metrics::HelveticaMetrics;
use super::{Font, PageRenderer, Rect, RenderError, Table, TextMeasure, TextRun};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    BeginPage,
    Image { path: PathBuf, rect: Rect },
    Text(TextRun),
    BeginRotation { degrees: f64, center: (f64, f64) },
    EndRotation,
    Table(Table),
    Finish,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    ops: Vec<RenderOp>,
    rotation_depth: usize,
    finished: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Instructions grouped per page, without the `BeginPage` markers.
    pub fn pages(&self) -> Vec<&[RenderOp]> {
        let starts: Vec<usize> = self
            .ops
            .iter()
            .enumerate()
            .filter(|(_, op)| matches!(op, RenderOp::BeginPage))
            .map(|(i, _)| i)
            .collect();
        starts
            .iter()
            .enumerate()
            .map(|(n, &start)| {
                let end = starts.get(n + 1).copied().unwrap_or_else(|| {
                    self.ops
                        .iter()
                        .rposition(|op| !matches!(op, RenderOp::Finish))
                        .map_or(start + 1, |i| i + 1)
                });
                &self.ops[start + 1..end]
            })
            .collect()
    }

    /// Text runs drawn on page `index`.
    pub fn texts_on_page(&self, index: usize) -> Vec<&TextRun> {
        self.pages()
            .get(index)
            .map(|ops| {
                ops.iter()
                    .filter_map(|op| match op {
                        RenderOp::Text(run) => Some(run),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn push(&mut self, op: RenderOp) -> Result<(), RenderError> {
        if self.finished {
            return Err(RenderError::Finished);
        }
        if !matches!(op, RenderOp::BeginPage) && self.ops.is_empty() {
            return Err(RenderError::NoPage);
        }
        self.ops.push(op);
        Ok(())
    }
}

impl TextMeasure for RecordingRenderer {
    fn text_width(&self, text: &str, font: Font, size: f64) -> f64 {
        HelveticaMetrics.text_width(text, font, size)
    }
}

impl PageRenderer for RecordingRenderer {
    fn begin_page(&mut self) -> Result<(), RenderError> {
        if self.rotation_depth != 0 {
            return Err(RenderError::UnbalancedRotation);
        }
        self.push(RenderOp::BeginPage)
    }

    fn draw_image(&mut self, path: &Path, rect: Rect) -> Result<(), RenderError> {
        self.push(RenderOp::Image {
            path: path.to_path_buf(),
            rect,
        })
    }

    fn draw_text(&mut self, run: &TextRun) -> Result<(), RenderError> {
        self.push(RenderOp::Text(run.clone()))
    }

    fn begin_rotation(&mut self, degrees: f64, center: (f64, f64)) -> Result<(), RenderError> {
        self.push(RenderOp::BeginRotation { degrees, center })?;
        self.rotation_depth += 1;
        Ok(())
    }

    fn end_rotation(&mut self) -> Result<(), RenderError> {
        if self.rotation_depth == 0 {
            return Err(RenderError::UnbalancedRotation);
        }
        self.push(RenderOp::EndRotation)?;
        self.rotation_depth -= 1;
        Ok(())
    }

    fn draw_table(&mut self, table: &Table) -> Result<(), RenderError> {
        self.push(RenderOp::Table(table.clone()))
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        if self.rotation_depth != 0 {
            return Err(RenderError::UnbalancedRotation);
        }
        self.push(RenderOp::Finish)?;
        self.finished = true;
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, RenderOp::BeginPage))
            .count()
    }
}
