//! Filesystem page store

use crate::storage::{PageStore, StorageError, StorageResult};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Mirrors pages into a directory tree under the publish directory
#[derive(Debug, Clone)]
pub struct FsPageStore {
    root: PathBuf,
}

impl FsPageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a relative page path, refusing anything that escapes the root
    fn resolve(&self, relative: &str) -> StorageResult<PathBuf> {
        let path = Path::new(relative);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if relative.is_empty() || escapes {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }
}

impl PageStore for FsPageStore {
    fn save(&self, relative: &str, contents: &[u8]) -> StorageResult<PathBuf> {
        let path = self.resolve(relative)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents).map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Saved {} ({} bytes)", path.display(), contents.len());
        Ok(path)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
