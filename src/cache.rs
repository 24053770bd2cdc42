//! Prepared-photo cache for repeat builds.
//!
//! Decoding, Lanczos resizing and JPEG encoding dominate a build, and the
//! same 13 photos are usually prepared over and over while a calendar is
//! being tuned (seed, subtitle, cuckoo date). This module lets the prepare
//! stage skip that work when the source photo and preparation parameters
//! have not changed.
//!
//! ## Cache keys
//!
//! The cache is **content-addressed**: lookups go by `source_hash` plus
//! `params_hash`, not by output file name. Renaming `03-march.jpg` to
//! `03-cherry-blossom.jpg` does not invalidate anything.
//!
//! - **`source_hash`**: SHA-256 of the source file contents.
//! - **`params_hash`**: SHA-256 of (width, height, quality, flip).
//!
//! A hit requires a matching entry **and** the prepared file still on disk.
//! A hit whose stored path differs from the wanted one is copied over.
//!
//! Palettes are memoized in the same manifest, keyed by source hash and
//! palette size.
//!
//! ## Storage
//!
//! `<temp-dir>/prepared/.cache-manifest.json`. Pass `--no-cache` to start
//! from an empty manifest.

use crate::color::Palette;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the prepared directory.
const MANIFEST_FILENAME: &str = ".cache-manifest.json";

/// Manifests with any other version are discarded on load.
const MANIFEST_VERSION: u32 = 1;

/// Content key of one prepared file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// On-disk cache manifest.
///
/// `entries` maps prepared file names to their content keys; `palettes`
/// maps `"{source_hash}:{size}"` to a memoized palette.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
    #[serde(default)]
    pub palettes: HashMap<String, Palette>,
    /// Content key → prepared file name. Rebuilt from `entries` on load.
    #[serde(skip)]
    content_index: HashMap<String, String>,
}

impl CacheManifest {
    /// Manifest for a first run or `--no-cache`.
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
            palettes: HashMap::new(),
            content_index: HashMap::new(),
        }
    }

    /// Load from `dir`. Returns an empty manifest if the file doesn't exist
    /// or can't be parsed (version mismatch, corruption).
    pub fn load(dir: &Path) -> Self {
        let path = manifest_path(dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let mut manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable cache manifest");
                return Self::empty();
            }
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest.content_index = build_content_index(&manifest.entries);
        manifest
    }

    /// Save to `dir`, first dropping palettes of sources no entry refers to.
    pub fn save(&mut self, dir: &Path) -> io::Result<()> {
        self.prune_palettes();
        let path = manifest_path(dir);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Look up a prepared file by content hashes.
    ///
    /// Returns the stored output path (relative to `dir`) if a matching
    /// entry exists **and** the file is still on disk.
    pub fn find_cached(&self, source_hash: &str, params_hash: &str, dir: &Path) -> Option<String> {
        self.content_index
            .get(&content_key(source_hash, params_hash))
            .filter(|stored| dir.join(stored).exists())
            .cloned()
    }

    /// Record a cache entry for an output file, dropping any entry that
    /// held the same content under another name.
    pub fn insert(&mut self, output_path: String, source_hash: String, params_hash: String) {
        let key = content_key(&source_hash, &params_hash);
        if let Some(previous) = self.content_index.insert(key, output_path.clone())
            && previous != output_path
        {
            self.entries.remove(&previous);
        }
        self.entries.insert(
            output_path,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }

    pub fn find_palette(&self, source_hash: &str, size: usize) -> Option<&Palette> {
        self.palettes.get(&palette_key(source_hash, size))
    }

    pub fn insert_palette(&mut self, source_hash: &str, size: usize, palette: Palette) {
        self.palettes.insert(palette_key(source_hash, size), palette);
    }

    fn prune_palettes(&mut self) {
        let live: HashSet<&str> = self
            .entries
            .values()
            .map(|entry| entry.source_hash.as_str())
            .collect();
        let before = self.palettes.len();
        self.palettes.retain(|key, _| {
            key.rsplit_once(':')
                .is_some_and(|(source_hash, _)| live.contains(source_hash))
        });
        let dropped = before - self.palettes.len();
        if dropped > 0 {
            tracing::debug!(dropped, "pruned palettes of replaced photos");
        }
    }
}

fn content_key(source_hash: &str, params_hash: &str) -> String {
    format!("{source_hash}:{params_hash}")
}

fn palette_key(source_hash: &str, size: usize) -> String {
    format!("{source_hash}:{size}")
}

fn build_content_index(entries: &HashMap<String, CacheEntry>) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(name, entry)| (content_key(&entry.source_hash, &entry.params_hash), name.clone()))
        .collect()
}

/// Hex SHA-256 of a file's bytes.
pub fn hash_file(path: &Path) -> io::Result<String> {
    Ok(format!("{:x}", Sha256::digest(std::fs::read(path)?)))
}

/// SHA-256 hash of preparation parameters.
pub fn hash_prepare_params(width: u32, height: u32, quality: u32, flip_vertical: bool) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"prepare\0");
    hasher.update(width.to_le_bytes());
    hasher.update(height.to_le_bytes());
    hasher.update(quality.to_le_bytes());
    hasher.update([u8::from(flip_vertical)]);
    format!("{:x}", hasher.finalize())
}

/// Per-run tally of prepared files, by how each was obtained.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits == 0 && self.copies == 0 {
            return write!(f, "{} prepared", self.misses);
        }
        write!(f, "{} cached", self.hits)?;
        if self.copies > 0 {
            write!(f, ", {} copied", self.copies)?;
        }
        write!(f, ", {} prepared ({} total)", self.misses, self.total())
    }
}

/// `<dir>/.cache-manifest.json`
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use std::fs;
    use tempfile::TempDir;

    // =========================================================================
    // Prepared-file entries
    // =========================================================================

    #[test]
    fn empty_manifest_has_no_entries() {
        let m = CacheManifest::empty();
        assert_eq!(m.version, MANIFEST_VERSION);
        assert!(m.entries.is_empty());
        assert!(m.palettes.is_empty());
    }

    #[test]
    fn hit_requires_file_on_disk() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("03-normal.jpg".into(), "src".into(), "prm".into());
        assert_eq!(m.find_cached("src", "prm", tmp.path()), None);

        fs::write(tmp.path().join("03-normal.jpg"), "jpeg").unwrap();
        assert_eq!(
            m.find_cached("src", "prm", tmp.path()),
            Some("03-normal.jpg".to_string())
        );
    }

    #[test]
    fn miss_on_any_hash_change() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("a.jpg".into(), "s".into(), "p".into());
        fs::write(tmp.path().join("a.jpg"), "jpeg").unwrap();

        assert_eq!(m.find_cached("other", "p", tmp.path()), None);
        assert_eq!(m.find_cached("s", "other", tmp.path()), None);
    }

    #[test]
    fn insert_moves_content_to_new_name() {
        let mut m = CacheManifest::empty();
        m.insert("03-normal.jpg".into(), "src".into(), "prm".into());
        m.insert("04-normal.jpg".into(), "src".into(), "prm".into());

        assert!(!m.entries.contains_key("03-normal.jpg"));
        assert!(m.entries.contains_key("04-normal.jpg"));
    }

    // =========================================================================
    // Palettes
    // =========================================================================

    #[test]
    fn palettes_keyed_by_source_and_size() {
        let mut m = CacheManifest::empty();
        let p = Palette::new(vec![Rgb(1, 2, 3)], Rgb(1, 2, 3));
        m.insert_palette("src", 4, p.clone());

        assert_eq!(m.find_palette("src", 4), Some(&p));
        assert_eq!(m.find_palette("src", 3), None);
        assert_eq!(m.find_palette("other", 4), None);
    }

    // =========================================================================
    // Save / Load
    // =========================================================================

    #[test]
    fn save_and_load_restores_entries_index_and_palettes() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("x.jpg".into(), "s1".into(), "p1".into());
        m.insert_palette("s1", 3, Palette::new(vec![Rgb::WHITE], Rgb::WHITE));
        m.save(tmp.path()).unwrap();
        assert!(manifest_path(tmp.path()).exists());

        let loaded = CacheManifest::load(tmp.path());
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(
            loaded.content_index.get("s1:p1"),
            Some(&"x.jpg".to_string())
        );
        assert!(loaded.find_palette("s1", 3).is_some());
    }

    #[test]
    fn save_drops_palettes_of_replaced_sources() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        let p = Palette::new(vec![Rgb::BLACK], Rgb::BLACK);
        m.insert("03-normal.jpg".into(), "old".into(), "p1".into());
        m.insert_palette("old", 4, p.clone());
        m.save(tmp.path()).unwrap();
        assert!(CacheManifest::load(tmp.path()).find_palette("old", 4).is_some());

        // The photo was edited: same output name, new source hash.
        let mut m = CacheManifest::load(tmp.path());
        m.insert("03-normal.jpg".into(), "new".into(), "p1".into());
        m.insert_palette("new", 4, p.clone());
        m.save(tmp.path()).unwrap();

        let loaded = CacheManifest::load(tmp.path());
        assert_eq!(loaded.palettes.len(), 1);
        assert_eq!(loaded.find_palette("new", 4), Some(&p));
        assert_eq!(loaded.find_palette("old", 4), None);
    }

    #[test]
    fn load_missing_or_corrupt_returns_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(CacheManifest::load(tmp.path()).entries.is_empty());

        fs::write(tmp.path().join(MANIFEST_FILENAME), "not json").unwrap();
        assert!(CacheManifest::load(tmp.path()).entries.is_empty());
    }

    #[test]
    fn load_wrong_version_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let json = format!(
            r#"{{"version": {}, "entries": {{"a": {{"source_hash":"h","params_hash":"p"}}}}}}"#,
            MANIFEST_VERSION + 1
        );
        fs::write(tmp.path().join(MANIFEST_FILENAME), json).unwrap();
        assert!(CacheManifest::load(tmp.path()).entries.is_empty());
    }

    // =========================================================================
    // Hashes and stats
    // =========================================================================

    #[test]
    fn hash_file_tracks_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.jpg");
        fs::write(&path, b"version 1").unwrap();
        let h1 = hash_file(&path).unwrap();
        assert_eq!(h1.len(), 64);
        assert_eq!(h1, hash_file(&path).unwrap());

        fs::write(&path, b"version 2").unwrap();
        assert_ne!(h1, hash_file(&path).unwrap());
    }

    #[test]
    fn prepare_params_hash_varies_with_every_input() {
        let base = hash_prepare_params(1200, 900, 90, false);
        assert_eq!(base, hash_prepare_params(1200, 900, 90, false));
        assert_ne!(base, hash_prepare_params(1201, 900, 90, false));
        assert_ne!(base, hash_prepare_params(1200, 901, 90, false));
        assert_ne!(base, hash_prepare_params(1200, 900, 91, false));
        assert_ne!(base, hash_prepare_params(1200, 900, 90, true));
    }

    #[test]
    fn cache_stats_display() {
        let mut s = CacheStats::default();
        s.misses = 3;
        assert_eq!(s.to_string(), "3 prepared");
        s.hits = 20;
        assert_eq!(s.to_string(), "20 cached, 3 prepared (23 total)");
        s.copies = 2;
        assert_eq!(s.to_string(), "20 cached, 2 copied, 3 prepared (25 total)");
    }
}
