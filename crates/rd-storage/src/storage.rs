//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for loading fragments by [`DocumentId`],
//! along with [`StorageError`] for unified error handling across backends.

use crate::document::{DocumentFragment, DocumentId};

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Fragment does not exist, or resolves outside the root.
    NotFound,
    /// Fragment exists but is not valid JSON.
    InvalidDocument,
    /// Root directory or identifier is unusable.
    InvalidPath,
}

/// Storage error with semantic kind and backend-specific source.
///
/// Containment violations are reported as [`StorageErrorKind::NotFound`]
/// without a source, so callers cannot tell them apart from missing files.
#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    document: Option<String>,
    backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            document: None,
            backend: None,
            source: None,
        }
    }

    /// Attach the requested document (or root path) as context.
    #[must_use]
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error for a document.
    #[must_use]
    pub fn not_found(document: &DocumentId) -> Self {
        Self::new(StorageErrorKind::NotFound).with_document(document.as_str())
    }

    /// Semantic error category.
    #[must_use]
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }

    /// Document or path context, if any.
    #[must_use]
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Backend identifier, if any.
    #[must_use]
    pub fn backend(&self) -> Option<&'static str> {
        self.backend
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (document: guide/intro/)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::InvalidDocument => "Invalid document",
            StorageErrorKind::InvalidPath => "Invalid path",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(document) = &self.document {
            write!(f, " (document: {document})")?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Fragment storage abstraction.
///
/// Implementations map a [`DocumentId`] to its fragment and must never
/// return content that lies outside their root.
pub trait Storage: Send + Sync {
    /// Load and parse the fragment of a document.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if the fragment is missing or
    /// escapes the root, [`StorageErrorKind::InvalidDocument`] if it is not
    /// valid JSON.
    fn load(&self, document: &DocumentId) -> Result<DocumentFragment, StorageError>;

    /// Check if a fragment exists for the document.
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, document: &DocumentId) -> bool;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_storage_error_new() {
        let err = StorageError::new(StorageErrorKind::NotFound);

        assert_eq!(err.kind(), &StorageErrorKind::NotFound);
        assert!(err.document().is_none());
        assert!(err.backend().is_none());
    }

    #[test]
    fn test_storage_error_not_found() {
        let id = DocumentId::parse("guide/").unwrap();
        let err = StorageError::not_found(&id);

        assert_eq!(err.kind(), &StorageErrorKind::NotFound);
        assert_eq!(err.document(), Some("guide/"));
    }

    #[test]
    fn test_storage_error_with_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StorageError::new(StorageErrorKind::InvalidDocument).with_source(json_err);

        assert!(err.downcast_source::<serde_json::Error>().is_some());
    }

    #[test]
    fn test_storage_error_display_simple() {
        let err = StorageError::new(StorageErrorKind::NotFound);

        assert_eq!(err.to_string(), "Not found");
    }

    #[test]
    fn test_storage_error_display_full() {
        let io_err = std::io::Error::other("broken pipe");
        let err = StorageError::new(StorageErrorKind::InvalidDocument)
            .with_backend("Fs")
            .with_document("guide/")
            .with_source(io_err);

        assert_eq!(
            err.to_string(),
            "[Fs] Invalid document: broken pipe (document: guide/)"
        );
    }

    #[test]
    fn test_storage_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StorageError>();
    }
}
