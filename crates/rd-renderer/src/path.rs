//! Reference classification and relative path arithmetic.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Matches references that carry a URL scheme (`https://`, `ftp://`, ...).
static EXTERNAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]+://").unwrap());

/// A raw `href`/`src` value, classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    /// Absolute URL with a scheme. Never rewritten.
    External(String),
    /// `#fragment` pointing into the current document (without the `#`).
    Anchor(String),
    /// Filesystem-style reference, with its trailing `#fragment` split off.
    Relative {
        /// Path part, may contain `..` segments.
        path: String,
        /// Fragment after the last `#`, if non-empty.
        anchor: Option<String>,
    },
}

impl Reference {
    /// Classify a raw reference.
    ///
    /// Order matters: a scheme wins over everything, then a leading `#`.
    ///
    /// # Example
    ///
    /// ```
    /// use rd_renderer::Reference;
    ///
    /// assert!(matches!(Reference::classify("https://sphinx-doc.org/"), Reference::External(_)));
    /// assert_eq!(Reference::classify("#usage"), Reference::Anchor("usage".to_owned()));
    /// assert_eq!(
    ///     Reference::classify("../setup/#step2"),
    ///     Reference::Relative { path: "../setup/".to_owned(), anchor: Some("step2".to_owned()) }
    /// );
    /// ```
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        if EXTERNAL_RE.is_match(raw) {
            return Self::External(raw.to_owned());
        }
        if let Some(anchor) = raw.strip_prefix('#') {
            return Self::Anchor(anchor.to_owned());
        }
        match raw.rfind('#') {
            Some(pos) => Self::Relative {
                path: raw[..pos].to_owned(),
                anchor: non_empty(&raw[pos + 1..]),
            },
            None => Self::Relative {
                path: raw.to_owned(),
                anchor: None,
            },
        }
    }

    /// Whether this reference is left untouched by rewriting.
    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }
}

/// Canonical target of a rewritten reference.
///
/// `document` is a root-relative document identifier (`setup/install/`), a
/// root-relative resource path (`_downloads/manual.pdf`), or empty for the
/// documentation root itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResolvedTarget {
    /// Root-relative document identifier or resource path.
    pub document: String,
    /// Fragment within the document.
    pub anchor: Option<String>,
}

impl ResolvedTarget {
    /// Create a target, dropping an empty anchor.
    #[must_use]
    pub fn new(document: impl Into<String>, anchor: Option<&str>) -> Self {
        Self {
            document: document.into(),
            anchor: anchor.and_then(non_empty),
        }
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.document)?;
        if let Some(anchor) = &self.anchor {
            write!(f, "#{anchor}")?;
        }
        Ok(())
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

/// Resolve a relative reference against a base path.
///
/// The base is expected to have had its document name stripped by the
/// caller; the empty segment appended here stands for that level, so the
/// first `..` only undoes it.
///
/// 1. Trim trailing `/` from `base`, split on `/`, append one empty segment.
/// 2. Pop one base segment per leading `..` of `relative`. Once the base is
///    exhausted further `..` segments are dropped, so the result stays at the
///    root instead of escaping it.
/// 3. Join the remaining base segments, a `/`, and the rest of `relative`.
/// 4. Collapse doubled slashes.
///
/// # Examples
///
/// ```
/// use rd_renderer::resolve_relative;
///
/// assert_eq!(resolve_relative("/docs/guide", "../setup/"), "/docs/guide/setup/");
/// assert_eq!(resolve_relative("/docs/guide", "../../setup/"), "/docs/setup/");
/// assert_eq!(resolve_relative("/docs/guide/intro", "tables/"), "/docs/guide/intro/tables/");
/// ```
#[must_use]
pub fn resolve_relative(base: &str, relative: &str) -> String {
    let mut base_segments: Vec<&str> = base.trim_end_matches('/').split('/').collect();
    base_segments.push("");

    let relative_segments: Vec<&str> = relative.split('/').collect();
    let parents = relative_segments
        .iter()
        .take_while(|segment| **segment == "..")
        .count();
    for _ in 0..parents {
        base_segments.pop();
    }

    let mut absolute = base_segments.join("/");
    absolute.push('/');
    absolute.push_str(&relative_segments[parents..].join("/"));

    collapse_slashes(&absolute)
}

/// Resolve a reference against a root-relative directory.
///
/// Returns a root-relative path: no leading slash, never above the root.
///
/// # Examples
///
/// ```
/// use rd_renderer::resolve_from_directory;
///
/// assert_eq!(resolve_from_directory("guide", "../../_images/diagram.png"), "_images/diagram.png");
/// assert_eq!(resolve_from_directory("", "guide/intro/"), "guide/intro/");
/// ```
#[must_use]
pub fn resolve_from_directory(directory: &str, relative: &str) -> String {
    let absolute = resolve_relative(&format!("/{directory}"), relative);
    absolute.trim_start_matches('/').to_owned()
}

/// Map a resolved generator path to a document identifier.
///
/// - `setup/install.html` → `setup/install/`
/// - `setup/install` → `setup/install/`
/// - `setup/install/` and `""` are kept
/// - resource paths with another extension (`_downloads/a.pdf`) are kept
#[must_use]
pub fn normalize_document(path: &str) -> String {
    if path.is_empty() || path.ends_with('/') {
        return path.to_owned();
    }
    if let Some(stem) = path.strip_suffix(".html") {
        return format!("{stem}/");
    }
    let name = path.rsplit('/').next().unwrap_or(path);
    if name.contains('.') {
        path.to_owned()
    } else {
        format!("{path}/")
    }
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}
