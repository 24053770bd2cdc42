//! Document build: both passes, one PDF each.
//!
//! ```text
//! out/cuckoo-2027.pdf          # normal pass
//! out/cuckoo-2027-mirror.pdf   # mirrored pass (flipped photos, rotated photo pages)
//! ```
//!
//! Each pass gets its own [`PageComposer`], so its random stream, day
//! cursor, render offset and event log all start fresh.

use crate::color::{Ciede2000, ColorDistance};
use crate::compose::{ComposeError, PageComposer, PassReport};
use crate::config::Settings;
use crate::photos::PhotoStore;
use crate::render::{PdfRenderer, RecordingRenderer};
use crate::types::Variant;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Composition failed for {variant} document: {source}")]
    Compose {
        variant: Variant,
        #[source]
        source: ComposeError,
    },
}

#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub pass: PassReport,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub documents: Vec<DocumentReport>,
}

impl BuildReport {
    /// The primary (normal) document.
    pub fn primary(&self) -> Option<&DocumentReport> {
        self.documents
            .iter()
            .find(|d| d.pass.variant == Variant::Normal)
    }
}

/// Write the normal and mirrored documents using CIEDE2000 for contrast.
pub fn build_calendar(
    settings: &Settings,
    store: &dyn PhotoStore,
) -> Result<BuildReport, BuildError> {
    build_with_distance(settings, store, &Ciede2000)
}

pub fn build_with_distance(
    settings: &Settings,
    store: &dyn PhotoStore,
    distance: &dyn ColorDistance,
) -> Result<BuildReport, BuildError> {
    let mut documents = Vec::with_capacity(Variant::ALL.len());
    for variant in Variant::ALL {
        let path = variant.output_path(&settings.output);
        let mut renderer = PdfRenderer::new(path.clone(), settings.config.page);
        let pass = PageComposer::new(settings, store, distance, variant)
            .and_then(|composer| composer.compose(&mut renderer))
            .map_err(|source| BuildError::Compose { variant, source })?;
        tracing::info!(
            path = %path.display(),
            %variant,
            pages = pass.pages,
            hidden_days = pass.hidden_days(),
            "document written"
        );
        documents.push(DocumentReport { path, pass });
    }
    Ok(BuildReport { documents })
}

/// Compose one pass without writing anything.
pub fn plan(
    settings: &Settings,
    store: &dyn PhotoStore,
    variant: Variant,
) -> Result<(PassReport, RecordingRenderer), BuildError> {
    let mut renderer = RecordingRenderer::new();
    let pass = PageComposer::new(settings, store, &Ciede2000, variant)
        .and_then(|composer| composer.compose(&mut renderer))
        .map_err(|source| BuildError::Compose { variant, source })?;
    Ok((pass, renderer))
}
