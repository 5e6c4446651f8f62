//! Document identifiers and fragment data.
//!
//! # Identifier Convention
//!
//! A [`DocumentId`] is a logical path with a trailing slash, the same form the
//! generator uses in its links:
//! - `"index/"` - root document (maps to `index.fjson`)
//! - `"guide/"` - top-level document (maps to `guide.fjson`)
//! - `"guide/intro/"` - nested document (maps to `guide/intro.fjson`)

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// File extension of fragments written by the Sphinx JSON builder.
pub const FRAGMENT_EXTENSION: &str = "fjson";

/// Error returned when a string is not a valid [`DocumentId`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DocumentIdError {
    /// The identifier is empty (or only slashes).
    #[error("Document identifier is empty")]
    Empty,
    /// The identifier does not end with `/`.
    #[error("Document identifier must end with '/': {0}")]
    MissingTrailingSlash(String),
}

/// Slash-terminated logical path of one document within the root.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Parse a slash-terminated document identifier.
    ///
    /// # Example
    ///
    /// ```
    /// use rd_storage::DocumentId;
    ///
    /// let id = DocumentId::parse("guide/intro/").unwrap();
    /// assert_eq!(id.fragment_file(), "guide/intro.fjson");
    /// assert!(DocumentId::parse("guide/intro").is_err());
    /// ```
    pub fn parse(value: impl Into<String>) -> Result<Self, DocumentIdError> {
        let value = value.into();
        if value.trim_matches('/').is_empty() {
            return Err(DocumentIdError::Empty);
        }
        if !value.ends_with('/') {
            return Err(DocumentIdError::MissingTrailingSlash(value));
        }
        Ok(Self(value))
    }

    /// The generator's root document, `index/`.
    #[must_use]
    pub fn index() -> Self {
        Self("index/".to_owned())
    }

    /// The generated general index, `genindex/`.
    #[must_use]
    pub fn general_index() -> Self {
        Self("genindex/".to_owned())
    }

    /// Build an identifier from a bare document name (`"index"` → `"index/"`).
    pub fn from_name(name: &str) -> Result<Self, DocumentIdError> {
        Self::parse(format!("{}/", name.trim_end_matches('/')))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fragment file name relative to the root (`guide/intro/` → `guide/intro.fjson`).
    #[must_use]
    pub fn fragment_file(&self) -> String {
        format!("{}.{FRAGMENT_EXTENSION}", self.0.trim_end_matches('/'))
    }

    /// Directory holding the document: the identifier minus its last segment.
    ///
    /// The last segment names a document, not a directory, so
    /// `guide/intro/` lives in `guide` and `index/` lives in the root (`""`).
    #[must_use]
    pub fn directory(&self) -> &str {
        let trimmed = self.0.trim_end_matches('/');
        trimmed.rfind('/').map_or("", |pos| &trimmed[..pos])
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `{title, link}` pair used by `prev`, `next` and `parents`.
///
/// `link` is relative to the document it was found in.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct NavLinkRef {
    /// Display title (may contain inline HTML).
    pub title: String,
    /// Relative reference to the target document.
    pub link: String,
}

/// Parsed JSON fragment for one document.
///
/// Every field is optional; which ones are required depends on what the host
/// renders (the body needs `body`, the table of contents needs `toc`).
/// Unknown fields written by the generator are ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct DocumentFragment {
    /// Document body HTML.
    #[serde(default)]
    pub body: Option<String>,
    /// Local table of contents HTML.
    #[serde(default)]
    pub toc: Option<String>,
    /// Document title.
    #[serde(default)]
    pub title: Option<String>,
    /// Previous document in reading order.
    #[serde(default)]
    pub prev: Option<NavLinkRef>,
    /// Next document in reading order.
    #[serde(default)]
    pub next: Option<NavLinkRef>,
    /// Ancestors of the document, root first.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub parents: Vec<NavLinkRef>,
    /// General index entries (only on the synthetic index document).
    #[serde(default)]
    pub genindexentries: Option<serde_json::Value>,
}

impl DocumentFragment {
    /// Whether this fragment is the generated general index.
    #[must_use]
    pub fn is_general_index(&self) -> bool {
        self.genindexentries.is_some()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<NavLinkRef>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<NavLinkRef>>::deserialize(deserializer)?.unwrap_or_default())
}
