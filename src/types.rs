//! Shared types used across the prepare and build stages.
//!
//! These are serialized into the prepared-photo manifest and build reports
//! and must stay stable between the two.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which of the two documents a pass produces.
///
/// The mirrored document is for double-sided binding: its month photos are
/// pre-flipped vertically and its photo pages rotated a half turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Normal,
    Mirrored,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Normal, Variant::Mirrored];

    pub fn is_mirrored(self) -> bool {
        self == Variant::Mirrored
    }

    /// Output path of this variant given the primary document path:
    /// `out/cal.pdf` → `out/cal.pdf` / `out/cal-mirror.pdf`.
    pub fn output_path(self, primary: &Path) -> PathBuf {
        match self {
            Variant::Normal => primary.to_path_buf(),
            Variant::Mirrored => {
                let stem = primary
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let ext = primary
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "pdf".to_string());
                primary.with_file_name(format!("{stem}-mirror.{ext}"))
            }
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Variant::Normal => "normal",
            Variant::Mirrored => "mirrored",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrored_output_path_gets_suffix() {
        let primary = Path::new("out/cuckoo-2025.pdf");
        assert_eq!(Variant::Normal.output_path(primary), primary);
        assert_eq!(
            Variant::Mirrored.output_path(primary),
            Path::new("out/cuckoo-2025-mirror.pdf")
        );
    }

    #[test]
    fn mirrored_keeps_extension_case() {
        assert_eq!(
            Variant::Mirrored.output_path(Path::new("Cal.PDF")),
            Path::new("Cal-mirror.PDF")
        );
    }

    #[test]
    fn display_and_serde_agree() {
        for v in Variant::ALL {
            let json = serde_json::to_string(&v).unwrap();
            assert_eq!(json, format!("\"{v}\""));
        }
    }
}
