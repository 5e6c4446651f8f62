//! Document loading and rendering.
//!
//! [`Site`] resolves a requested document against a [`Storage`], falling back
//! to the default document, and renders it in one of the [`RenderMode`]s.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rd_renderer::{Attributes, ResolvedTarget};
//! use rd_site::{RenderMode, Site, SiteConfig};
//! use rd_storage::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new("docs".into()));
//! let site = Site::new(storage, SiteConfig::default());
//!
//! let links = |target: &ResolvedTarget| format!("/docs?doc={target}");
//! let images = |attributes: &Attributes| format!(r#"<img src="/docs/{}">"#, attributes["src"]);
//! let result = site.render(Some("guide/intro/"), RenderMode::Body, &links, &images)?;
//! ```

use std::sync::Arc;

use rd_renderer::{ImageRenderer, LinkOptions, LinkResolver, rewrite_images, rewrite_links};
use rd_storage::{DocumentFragment, DocumentId, Storage, StorageError, StorageErrorKind};
use serde::Serialize;

use crate::index::{parse_index, render_index};
use crate::navigation::{
    BreadcrumbItem, QuickNavigation, Toc, TocOptions, breadcrumb, quick_navigation,
    table_of_contents,
};

/// Error returned when a document cannot be rendered.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Neither the requested nor the default document exists.
    #[error("Invalid path for the documentation: default document {0} not found")]
    InvalidPath(String),
    /// The fragment lacks the field required by the render mode.
    #[error("Document {document} has no {field}")]
    MissingField {
        document: String,
        field: &'static str,
    },
    /// The store failed to load a document.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What to render from a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Body with links and images rewritten.
    #[default]
    Body,
    /// Table of contents.
    Toc,
    Title,
    Breadcrumb,
    QuickNavigation,
    /// The general index, whatever document was requested.
    Index,
}

/// Configuration for [`Site`].
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Document served when none, or an invalid one, is requested.
    pub default_document: DocumentId,
    /// Keep heading permalinks in bodies.
    pub keep_permanent_links: bool,
    /// Escape ampersands of TOC links for XML-strict hosts.
    pub xhtml_toc: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_document: DocumentId::index(),
            keep_permanent_links: false,
            xhtml_toc: true,
        }
    }
}

/// Rendered content of one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RenderOutput {
    Body(String),
    Toc(Toc),
    Title(String),
    Breadcrumb(Vec<BreadcrumbItem>),
    QuickNavigation(QuickNavigation),
    Index(String),
}

impl RenderOutput {
    /// HTML or text of the modes producing a plain string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Body(text) | Self::Title(text) | Self::Index(text) => Some(text),
            Self::Toc(toc) => Some(&toc.html),
            Self::Breadcrumb(_) | Self::QuickNavigation(_) => None,
        }
    }
}

/// Result of [`Site::render`].
#[derive(Clone, Debug, Serialize)]
pub struct RenderResult {
    /// Document that was actually rendered.
    pub document: DocumentId,
    pub output: RenderOutput,
    /// Tags that could not be rewritten.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Whether the default document replaced the requested one.
    pub fallback: bool,
}

/// Document loaded by [`Site::load`].
#[derive(Clone, Debug)]
pub struct LoadedDocument {
    pub id: DocumentId,
    pub fragment: DocumentFragment,
    /// Whether the default document replaced the requested one.
    pub fallback: bool,
}

/// Documentation tree rendered through host collaborators.
///
/// Holds no per-request state; one instance can serve concurrent requests.
pub struct Site {
    storage: Arc<dyn Storage>,
    config: SiteConfig,
}

impl Site {
    /// Create a site over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: SiteConfig) -> Self {
        Self { storage, config }
    }

    /// Site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Load the requested document, or the default document.
    ///
    /// The default document is used when nothing is requested, when the
    /// request contains `..` or is not a valid identifier, and when the
    /// requested document does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidPath`] if the default document does not
    /// exist either, and [`RenderError::Storage`] if a document exists but
    /// cannot be read.
    pub fn load(&self, requested: Option<&str>) -> Result<LoadedDocument, RenderError> {
        if let Some(id) = requested.and_then(requested_document) {
            match self.storage.load(&id) {
                Ok(fragment) => {
                    tracing::debug!(document = %id, "Loaded document");
                    return Ok(LoadedDocument {
                        id,
                        fragment,
                        fallback: false,
                    });
                }
                Err(e) if *e.kind() == StorageErrorKind::NotFound => {
                    tracing::warn!(document = %id, "Document not found, using default document");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let default = &self.config.default_document;
        match self.storage.load(default) {
            Ok(fragment) => {
                tracing::debug!(document = %default, "Loaded default document");
                Ok(LoadedDocument {
                    id: default.clone(),
                    fragment,
                    fallback: requested.is_some(),
                })
            }
            Err(e) if *e.kind() == StorageErrorKind::NotFound => {
                Err(RenderError::InvalidPath(default.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Render a document.
    ///
    /// A fragment holding the general index is always rendered as the
    /// index, whatever the mode.
    ///
    /// # Errors
    ///
    /// Returns an error if no document can be loaded or if the fragment lacks
    /// the field the mode needs.
    pub fn render(
        &self,
        requested: Option<&str>,
        mode: RenderMode,
        links: &dyn LinkResolver,
        images: &dyn ImageRenderer,
    ) -> Result<RenderResult, RenderError> {
        let loaded = if mode == RenderMode::Index {
            let id = DocumentId::general_index();
            let fragment = self.storage.load(&id)?;
            LoadedDocument {
                id,
                fragment,
                fallback: false,
            }
        } else {
            self.load(requested)?
        };
        let LoadedDocument {
            id,
            fragment,
            fallback,
        } = loaded;

        let mut warnings = Vec::new();
        let output = if let Some(raw) = &fragment.genindexentries {
            RenderOutput::Index(render_index(
                &parse_index(raw),
                &id,
                links,
                &self.config.default_document,
            ))
        } else {
            match mode {
                RenderMode::Body | RenderMode::Index => {
                    let body = require(&id, fragment.body.as_deref(), "body")?;
                    let html = rewrite_links(body, &id, links, &self.link_options());
                    let rewrite = rewrite_images(&html, &id, images);
                    warnings.extend(rewrite.errors.iter().map(ToString::to_string));
                    RenderOutput::Body(rewrite.html)
                }
                RenderMode::Toc => {
                    let options = TocOptions {
                        links: self.link_options(),
                        xhtml: self.config.xhtml_toc,
                    };
                    let toc = table_of_contents(&fragment, &id, links, &options);
                    RenderOutput::Toc(require(&id, toc, "toc")?)
                }
                RenderMode::Title => {
                    let title = require(&id, fragment.title.as_deref(), "title")?;
                    RenderOutput::Title(title.to_owned())
                }
                RenderMode::Breadcrumb => RenderOutput::Breadcrumb(breadcrumb(&fragment, &id, links)),
                RenderMode::QuickNavigation => RenderOutput::QuickNavigation(quick_navigation(
                    &fragment,
                    &id,
                    links,
                    self.storage.as_ref(),
                    &self.config.default_document,
                )),
            }
        };

        Ok(RenderResult {
            document: id,
            output,
            warnings,
            fallback,
        })
    }

    fn link_options(&self) -> LinkOptions {
        LinkOptions {
            keep_permanent_links: self.config.keep_permanent_links,
            default_document: self.config.default_document.clone(),
        }
    }
}

/// Identifier of a requested document, `None` if it must not be served.
fn requested_document(requested: &str) -> Option<DocumentId> {
    if requested.contains("..") {
        tracing::warn!(requested, "Rejected document with parent reference");
        return None;
    }
    match DocumentId::parse(requested) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(requested, error = %e, "Invalid document requested");
            None
        }
    }
}

fn require<T>(document: &DocumentId, value: Option<T>, field: &'static str) -> Result<T, RenderError> {
    value.ok_or_else(|| RenderError::MissingField {
        document: document.to_string(),
        field,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rd_renderer::{Attributes, ResolvedTarget};
    use rd_storage::MockStorage;

    use super::*;

    fn page_link(target: &ResolvedTarget) -> String {
        format!("/page?doc={target}")
    }

    fn image(attributes: &Attributes) -> String {
        format!(r#"<img src="/static/{}" />"#, attributes["src"])
    }

    fn storage() -> MockStorage {
        MockStorage::new()
            .with_json("index/", r#"{"title": "Home", "body": "<p>Welcome</p>"}"#)
            .with_json(
                "guide/intro/",
                r##"{
                    "title": "Introduction",
                    "body": "<h1>Introduction<a class=\"headerlink\" href=\"#introduction\" title=\"Permalink\">¶</a></h1><p>See <a class=\"reference internal\" href=\"../../setup/install.html#step2\">Install</a>.</p><img src=\"../../_images/diagram.png\" alt=\"Diagram\"><img alt=\"broken\">",
                    "toc": "<ul>\n<li><a class=\"reference internal\" href=\"#\">Introduction</a><ul>\n</ul>\n</li>\n</ul>\n",
                    "prev": {"title": "Guide", "link": "../"},
                    "parents": [{"title": "Guide", "link": "../"}]
                }"##,
            )
            .with_json("broken/", "{not json")
    }

    fn site(storage: MockStorage) -> Site {
        Site::new(Arc::new(storage), SiteConfig::default())
    }

    fn render(site: &Site, requested: Option<&str>, mode: RenderMode) -> Result<RenderResult, RenderError> {
        site.render(requested, mode, &page_link, &image)
    }

    #[test]
    fn test_render_body() {
        let result = render(&site(storage()), Some("guide/intro/"), RenderMode::Body).unwrap();

        assert_eq!(result.document.as_str(), "guide/intro/");
        assert!(!result.fallback);
        assert_eq!(
            result.output,
            RenderOutput::Body(concat!(
                "<h1>Introduction</h1>",
                r#"<p>See <a class="reference internal" href="/page?doc=setup/install/#step2">Install</a>.</p>"#,
                r#"<img src="/static/_images/diagram.png" />"#,
                r#"<img alt="broken">"#,
            )
            .to_owned())
        );
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("without src"));
    }

    #[test]
    fn test_keep_permanent_links() {
        let site = Site::new(
            Arc::new(storage()),
            SiteConfig {
                keep_permanent_links: true,
                ..SiteConfig::default()
            },
        );

        let result = render(&site, Some("guide/intro/"), RenderMode::Body).unwrap();

        assert!(result.output.as_text().unwrap().contains(r#"class="headerlink""#));
    }

    #[test]
    fn test_fallback_on_missing_document() {
        let result = render(&site(storage()), Some("missing/"), RenderMode::Title).unwrap();

        assert_eq!(result.document, DocumentId::index());
        assert!(result.fallback);
        assert_eq!(result.output, RenderOutput::Title("Home".to_owned()));
    }

    #[test]
    fn test_fallback_on_parent_reference_and_missing_slash() {
        let site = site(storage());

        for requested in ["../guide/intro/", "guide/../index/", "guide/intro"] {
            let loaded = site.load(Some(requested)).unwrap();
            assert_eq!(loaded.id, DocumentId::index(), "{requested}");
            assert!(loaded.fallback);
        }
    }

    #[test]
    fn test_nothing_requested_uses_default() {
        let loaded = site(storage()).load(None).unwrap();

        assert_eq!(loaded.id, DocumentId::index());
        assert!(!loaded.fallback);
    }

    #[test]
    fn test_custom_default_document() {
        let storage = MockStorage::new().with_json("start/", r#"{"title": "Start"}"#);
        let site = Site::new(
            Arc::new(storage),
            SiteConfig {
                default_document: DocumentId::parse("start/").unwrap(),
                ..SiteConfig::default()
            },
        );

        assert_eq!(site.load(Some("index/")).unwrap().id.as_str(), "start/");
    }

    #[test]
    fn test_default_document_missing() {
        let site = site(MockStorage::new());

        let err = render(&site, Some("guide/"), RenderMode::Body).unwrap_err();

        assert!(matches!(err, RenderError::InvalidPath(ref doc) if doc == "index/"));
        assert!(err.to_string().contains("index/"));
    }

    #[test]
    fn test_invalid_document_is_not_a_fallback() {
        let err = render(&site(storage()), Some("broken/"), RenderMode::Body).unwrap_err();

        let RenderError::Storage(storage_err) = &err else {
            panic!("expected storage error, got {err:?}");
        };
        assert_eq!(storage_err.kind(), &StorageErrorKind::InvalidDocument);
    }

    #[test]
    fn test_missing_field() {
        let err = render(&site(storage()), None, RenderMode::Toc).unwrap_err();

        assert!(matches!(
            err,
            RenderError::MissingField {
                field: "toc",
                ..
            }
        ));
    }

    #[test]
    fn test_render_toc() {
        let result = render(&site(storage()), Some("guide/intro/"), RenderMode::Toc).unwrap();

        let RenderOutput::Toc(toc) = result.output else {
            panic!("expected toc");
        };
        assert_eq!(
            toc.html,
            "<ul><li class=\"current\"><a class=\"reference internal\" href=\"/page?doc=guide/intro/\">Introduction</a>\n</li>\n</ul>\n"
        );
        assert!(toc.entries[0].current);
    }

    #[test]
    fn test_render_breadcrumb_and_quick_navigation() {
        let site = site(storage());

        let breadcrumb = render(&site, Some("guide/intro/"), RenderMode::Breadcrumb).unwrap();
        let RenderOutput::Breadcrumb(items) = breadcrumb.output else {
            panic!("expected breadcrumb");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url, "/page?doc=guide/");
        assert!(items[1].active);

        let quick = render(&site, Some("guide/intro/"), RenderMode::QuickNavigation).unwrap();
        let RenderOutput::QuickNavigation(navigation) = quick.output else {
            panic!("expected quick navigation");
        };
        assert!(navigation.has_previous);
        assert!(!navigation.has_next);
        assert!(!navigation.has_index);
    }

    #[test]
    fn test_general_index_overrides_mode() {
        let storage = storage().with_json(
            "genindex/",
            r#"{"title": "Index", "genindexentries": [["A", [["Apple", [["Apple", "../fruit/apple.html"]]]]]]}"#,
        );
        let site = site(storage);

        let result = render(&site, Some("genindex/"), RenderMode::Toc).unwrap();
        let RenderOutput::Index(html) = &result.output else {
            panic!("expected index");
        };
        assert!(html.contains(r#"<h2 id="index-a">A</h2>"#));
        assert!(html.contains(r#"<a href="/page?doc=genindex/#index-a">"#));
        assert!(html.contains(r#"<dt><a href="/page?doc=fruit/apple/">Apple</a></dt>"#));

        let index = render(&site, Some("guide/intro/"), RenderMode::Index).unwrap();
        assert_eq!(index.document, DocumentId::general_index());
        assert_eq!(index.output, result.output);
    }

    #[test]
    fn test_index_mode_without_index() {
        let err = render(&site(storage()), None, RenderMode::Index).unwrap_err();

        assert!(matches!(err, RenderError::Storage(_)));
    }

    #[test]
    fn test_output_serialization() {
        let value = serde_json::to_value(RenderOutput::Title("Home".to_owned())).unwrap();

        assert_eq!(value, serde_json::json!({"kind": "title", "value": "Home"}));
    }
}
