//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::document::{DocumentFragment, DocumentId};
use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// In-memory storage keyed by document identifier.
///
/// Fragments are kept as raw JSON so that `load()` goes through the same
/// parsing (and the same errors) as the filesystem backend.
///
/// # Example
///
/// ```ignore
/// use rd_storage::{DocumentId, MockStorage, Storage};
///
/// let storage = MockStorage::new().with_json("index/", r#"{"title": "Home"}"#);
/// let fragment = storage.load(&DocumentId::parse("index/").unwrap()).unwrap();
/// assert_eq!(fragment.title.as_deref(), Some("Home"));
/// ```
#[derive(Default)]
pub struct MockStorage {
    fragments: RwLock<HashMap<String, String>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add raw fragment JSON for a document identifier.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_json(self, document: impl Into<String>, json: impl Into<String>) -> Self {
        self.fragments
            .write()
            .unwrap()
            .insert(document.into(), json.into());
        self
    }

    /// Add a fragment for a document identifier.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned or the fragment fails to serialize.
    #[must_use]
    pub fn with_fragment(self, document: impl Into<String>, fragment: &DocumentFragment) -> Self {
        let json = serde_json::to_string(fragment).unwrap();
        self.with_json(document, json)
    }
}

impl Storage for MockStorage {
    fn load(&self, document: &DocumentId) -> Result<DocumentFragment, StorageError> {
        let fragments = self.fragments.read().unwrap();
        let json = fragments
            .get(document.as_str())
            .ok_or_else(|| StorageError::not_found(document).with_backend(BACKEND))?;

        serde_json::from_str(json).map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidDocument)
                .with_document(document.as_str())
                .with_backend(BACKEND)
                .with_source(e)
        })
    }

    fn exists(&self, document: &DocumentId) -> bool {
        self.fragments
            .read()
            .unwrap()
            .contains_key(document.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> DocumentId {
        DocumentId::parse(value).unwrap()
    }

    #[test]
    fn test_mock_load() {
        let storage = MockStorage::new().with_json("guide/", r#"{"title": "Guide"}"#);

        let fragment = storage.load(&id("guide/")).unwrap();

        assert_eq!(fragment.title.as_deref(), Some("Guide"));
        assert!(storage.exists(&id("guide/")));
    }

    #[test]
    fn test_mock_missing() {
        let storage = MockStorage::new();

        let err = storage.load(&id("guide/")).unwrap_err();

        assert_eq!(err.kind(), &StorageErrorKind::NotFound);
        assert_eq!(err.backend(), Some("Mock"));
    }

    #[test]
    fn test_mock_invalid_json() {
        let storage = MockStorage::new().with_json("guide/", "[");

        let err = storage.load(&id("guide/")).unwrap_err();

        assert_eq!(err.kind(), &StorageErrorKind::InvalidDocument);
    }

    #[test]
    fn test_mock_with_fragment() {
        let fragment = DocumentFragment {
            title: Some("Setup".to_owned()),
            ..Default::default()
        };
        let storage = MockStorage::new().with_fragment("setup/", &fragment);

        assert_eq!(storage.load(&id("setup/")).unwrap(), fragment);
    }
}
