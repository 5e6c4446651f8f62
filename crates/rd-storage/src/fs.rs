//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading fragments from a documentation root on
//! the local filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{DocumentFragment, DocumentId};
use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage implementation.
///
/// Reads `<root>/<document>.fjson`. After resolving symlinks the fragment
/// must still be a descendant of the resolved root; anything else is reported
/// as not found.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use rd_storage::{DocumentId, FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("docs/_build/json"));
/// let fragment = storage.load(&DocumentId::parse("index/")?)?;
/// ```
pub struct FsStorage {
    /// Documentation root as configured.
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Documentation root as configured.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the root to its real path.
    fn canonical_root(&self) -> Result<PathBuf, StorageError> {
        if !self.root.is_dir() {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_document(self.root.display().to_string())
                .with_backend(BACKEND));
        }
        fs::canonicalize(&self.root).map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidPath)
                .with_document(self.root.display().to_string())
                .with_backend(BACKEND)
                .with_source(e)
        })
    }

    /// Locate the fragment file of a document inside the root.
    ///
    /// Fails closed: a missing file and a file whose real path escapes the
    /// root produce the same error, without the underlying I/O error.
    fn locate(&self, document: &DocumentId) -> Result<PathBuf, StorageError> {
        let root = self.canonical_root()?;
        let candidate = self.root.join(document.fragment_file());

        let not_found = || StorageError::not_found(document).with_backend(BACKEND);

        let Ok(real) = fs::canonicalize(&candidate) else {
            return Err(not_found());
        };
        if !real.starts_with(&root) {
            tracing::warn!(document = %document, "Fragment resolves outside documentation root");
            return Err(not_found());
        }
        if !real.is_file() {
            return Err(not_found());
        }
        Ok(real)
    }
}

impl Storage for FsStorage {
    fn load(&self, document: &DocumentId) -> Result<DocumentFragment, StorageError> {
        let path = self.locate(document)?;
        tracing::debug!(document = %document, path = %path.display(), "Loading fragment");

        let content = fs::read(&path).map_err(|e| {
            tracing::debug!(document = %document, error = %e, "Fragment not readable");
            StorageError::not_found(document).with_backend(BACKEND)
        })?;

        serde_json::from_slice(&content).map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidDocument)
                .with_document(document.as_str())
                .with_backend(BACKEND)
                .with_source(e)
        })
    }

    fn exists(&self, document: &DocumentId) -> bool {
        self.locate(document).is_ok()
    }
}
