//! Content hashes for filtering no-op saves

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Last seen content hash per file
#[derive(Debug, Default)]
pub struct ContentHashes {
    hashes: HashMap<PathBuf, String>,
}

impl ContentHashes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current content of every `extension` file in `dir`
    ///
    /// Unreadable entries are skipped.
    pub fn seed_directory(&mut self, dir: &Path, extension: Option<&str>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for path in entries.filter_map(|entry| entry.ok()).map(|entry| entry.path()) {
            if path.extension().and_then(|e| e.to_str()) != extension {
                continue;
            }
            let path = path.canonicalize().unwrap_or(path);
            if let Ok(content) = fs::read_to_string(&path) {
                self.update(&path, &content);
            }
        }
    }

    /// Store the hash of `content` for `path`; true if it differs from the last one
    pub fn update(&mut self, path: &Path, content: &str) -> bool {
        let hash = compute_content_hash(content);
        match self.hashes.get(path) {
            Some(previous) if *previous == hash => false,
            _ => {
                self.hashes.insert(path.to_path_buf(), hash);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Compute a simple hash of content for change detection
pub fn compute_content_hash(content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}
