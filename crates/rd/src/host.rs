//! Link and image collaborators used by the CLI.
//!
//! Documents are linked through a single page carrying the document
//! identifier in a query parameter; static files (images, downloads) are
//! served from the public URL of the documentation root.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rd_config::LinksConfig;
use rd_renderer::{Attributes, ImageRenderer, LinkResolver, ResolvedTarget};

/// Unreserved characters plus `/`, kept readable in document identifiers.
const DOCUMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Targets under this directory are files, not documents.
const DOWNLOADS_PREFIX: &str = "_downloads/";

/// Join a root-relative path to the public URL of the documentation root.
fn static_path(static_url: &str, path: &str) -> String {
    if static_url.is_empty() {
        return path.to_owned();
    }
    format!("{}/{}", static_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn is_absolute_source(src: &str) -> bool {
    src.starts_with("data:") || src.starts_with('/') || src.contains("://")
}

/// Links documents as `{base_url}?{parameter}={document}#{anchor}`.
pub(crate) struct QueryLinkResolver {
    base_url: String,
    parameter: String,
    static_url: String,
}

impl QueryLinkResolver {
    pub(crate) fn new(config: &LinksConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            parameter: config.parameter.clone(),
            static_url: config.static_url.clone(),
        }
    }
}

impl LinkResolver for QueryLinkResolver {
    fn resolve(&self, target: &ResolvedTarget) -> String {
        let mut url = if target.document.starts_with(DOWNLOADS_PREFIX) {
            static_path(&self.static_url, &target.document)
        } else if target.document.is_empty() {
            // Root of the documentation: the page itself.
            self.base_url.clone()
        } else {
            let separator = if self.base_url.contains('?') { '&' } else { '?' };
            format!(
                "{}{separator}{}={}",
                self.base_url,
                self.parameter,
                utf8_percent_encode(&target.document, DOCUMENT_ENCODE_SET)
            )
        };

        if let Some(anchor) = &target.anchor {
            url.push('#');
            url.push_str(anchor);
        }
        url
    }
}

/// Renders images as plain `<img>` tags served from the static URL.
pub(crate) struct HtmlImageRenderer {
    static_url: String,
}

impl HtmlImageRenderer {
    pub(crate) fn new(config: &LinksConfig) -> Self {
        Self {
            static_url: config.static_url.clone(),
        }
    }
}

impl ImageRenderer for HtmlImageRenderer {
    fn render(&self, attributes: &Attributes) -> String {
        let mut html = String::from("<img");
        for (name, value) in attributes {
            let value = if name == "src" && !is_absolute_source(value) {
                static_path(&self.static_url, value)
            } else {
                value.clone()
            };
            html.push(' ');
            html.push_str(name);
            html.push_str("=\"");
            html.push_str(&html_escape::encode_double_quoted_attribute(&value));
            html.push('"');
        }
        html.push_str(" />");
        html
    }
}
