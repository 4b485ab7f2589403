//! Catalog file storage.
//!
//! One JSON document per repository at `<root>/<owner>/<repo>.json`. The
//! path is a deterministic function of owner and name, so re-processing a
//! repository overwrites its file rather than creating a duplicate. Files
//! are independent of each other: a partially completed run never corrupts
//! entries written earlier.

use std::io;
use std::path::{Path, PathBuf};

use super::entry::CatalogEntry;

/// File-backed catalog rooted at a directory.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    root: PathBuf,
}

impl CatalogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path an entry for `owner`/`repo` is stored at.
    #[must_use]
    pub fn entry_path(&self, owner: &str, repo: &str) -> PathBuf {
        self.root.join(owner).join(format!("{repo}.json"))
    }

    /// Write an entry, creating the owner directory on demand.
    ///
    /// Full overwrite: the document on disk always reflects exactly one
    /// fetch.
    pub fn write(&self, entry: &CatalogEntry) -> io::Result<PathBuf> {
        let path = self.entry_path(&entry.owner, &entry.repo);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_vec_pretty(entry)?;
        json.push(b'\n');
        std::fs::write(&path, json)?;
        Ok(path)
    }

    /// Read an entry back, if present.
    pub fn read(&self, owner: &str, repo: &str) -> io::Result<Option<CatalogEntry>> {
        match std::fs::read(self.entry_path(owner, repo)) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
