//! Image discovery in a single directory

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions picked up by default (compared case-insensitively).
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Counters collected during a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub entries_seen: usize,
    pub images_found: usize,
    pub skipped_extension: usize,
    pub skipped_not_file: usize,
}

/// Finds image files directly inside a directory, following symlinks.
pub struct ImageScanner {
    root_path: PathBuf,
    stats: ScanStats,
}

impl ImageScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path, stats: ScanStats::default() }
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    fn has_image_extension(path: &Path) -> bool {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
        DEFAULT_IMAGE_EXTENSIONS.contains(&ext.as_str())
    }

    /// Return matching files sorted by path.
    pub fn scan(&mut self) -> Result<Vec<PathBuf>> {
        self.stats = ScanStats::default();
        let mut images = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);

        for entry in walker {
            let entry = entry
                .with_context(|| format!("Failed to read directory {}", self.root_path.display()))?;
            self.stats.entries_seen += 1;

            if !entry.file_type().is_file() {
                self.stats.skipped_not_file += 1;
                continue;
            }
            if !Self::has_image_extension(entry.path()) {
                self.stats.skipped_extension += 1;
                continue;
            }
            images.push(entry.into_path());
        }

        images.sort();
        self.stats.images_found = images.len();
        tracing::debug!(
            root = %self.root_path.display(),
            found = images.len(),
            skipped_extension = self.stats.skipped_extension,
            "scanned for images"
        );
        Ok(images)
    }
}
