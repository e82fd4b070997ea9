//! Audio corpus index
//!
//! Recursively scans a directory for supported audio files and builds a
//! lookup keyed by both the filename and its extension-stripped stem.
//! Annotation sources reference recordings inconsistently (with and without
//! extension, sometimes with leading directories); the dual keys absorb
//! that without any per-request path probing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use earmark_common::{Error, Result};

/// Audio file extensions the corpus recognizes (decoder-supported formats)
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["mp3", "wav", "ogg", "flac", "m4a"];

/// One physical audio file under the corpus root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub absolute_path: PathBuf,
    /// Filename with extension
    pub base_name: String,
    /// Filename without extension
    pub stem: String,
}

/// Index over all audio files under one root directory
#[derive(Debug)]
pub struct CorpusIndex {
    root: PathBuf,
    /// All entries, lexicographically sorted by path
    entries: Vec<CorpusEntry>,
    /// base_name and stem keys to entry position
    lookup: HashMap<String, usize>,
}

impl CorpusIndex {
    /// Scan `root` recursively and build the index.
    ///
    /// Fails with `InvalidPath` when `root` does not exist or is not a
    /// directory, checked up front so the caller gets one clear error
    /// instead of an empty result. Unreadable entries encountered mid-walk
    /// are logged and skipped.
    pub fn build(root: &Path) -> Result<CorpusIndex> {
        if !root.exists() {
            return Err(Error::InvalidPath(format!(
                "{} does not exist",
                root.display()
            )));
        }

        if !root.is_dir() {
            return Err(Error::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let mut entries = Vec::new();

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error accessing entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !is_supported_extension(path) {
                continue;
            }

            let Some(base_name) = path.file_name().and_then(|n| n.to_str()) else {
                warn!("Skipping non-UTF-8 filename: {}", path.display());
                continue;
            };
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(base_name);

            entries.push(CorpusEntry {
                absolute_path: path.to_path_buf(),
                base_name: base_name.to_string(),
                stem: stem.to_string(),
            });
        }

        // Ordering is a final pass over the complete walk, not a
        // per-directory property of the traversal
        entries.sort_by(|a, b| a.absolute_path.cmp(&b.absolute_path));

        // Later sorted entries overwrite colliding keys, so a duplicate
        // filename resolves deterministically to the lexicographically
        // last path that carries it
        let mut lookup = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            lookup.insert(entry.base_name.clone(), idx);
            lookup.insert(entry.stem.clone(), idx);
        }

        debug!(
            "Indexed {} audio files under {}",
            entries.len(),
            root.display()
        );

        Ok(CorpusIndex {
            root: root.to_path_buf(),
            entries,
            lookup,
        })
    }

    /// Resolve a bare filename or extension-stripped stem to its entry
    pub fn resolve(&self, name: &str) -> Option<&CorpusEntry> {
        self.lookup.get(name).map(|&idx| &self.entries[idx])
    }

    /// All entries in path order
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
