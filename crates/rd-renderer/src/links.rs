//! Anchor tag rewriting.
//!
//! Rewrites the `href` of every `<a>` tag in a fragment into a host URL
//! obtained from a [`LinkResolver`].

use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

use rd_storage::DocumentId;
use regex::Regex;

use crate::path::{Reference, ResolvedTarget, normalize_document, resolve_from_directory};
use crate::substitute::{Substitution, apply_substitutions};

/// Opening of an anchor tag up to its `href` value, and the value itself.
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<a .*? href=")([^"]+)"#).unwrap());

/// Section permalink decoration emitted next to every heading.
static PERMALINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a class="headerlink" [^>]+>[^<]+</a>"#).unwrap());

/// Any double-quoted `href` attribute.
static HREF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#" href="([^"]+)""#).unwrap());

/// Host collaborator turning a canonical target into a URL.
///
/// Must return the same URL for the same target within one render.
pub trait LinkResolver {
    /// Build the URL of `target`.
    fn resolve(&self, target: &ResolvedTarget) -> String;
}

impl<F> LinkResolver for F
where
    F: Fn(&ResolvedTarget) -> String,
{
    fn resolve(&self, target: &ResolvedTarget) -> String {
        self(target)
    }
}

/// Options for [`rewrite_links`].
#[derive(Clone, Debug)]
pub struct LinkOptions {
    /// Keep the `headerlink` permalinks next to headings.
    pub keep_permanent_links: bool,
    /// Document served at the root of the documentation (usually `index/`).
    pub default_document: DocumentId,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            keep_permanent_links: false,
            default_document: DocumentId::index(),
        }
    }
}

/// One `href` found by [`scan_links`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkMatch {
    /// Byte range of the `href` value.
    pub span: Range<usize>,
    /// Classified value.
    pub reference: Reference,
}

/// Find the `href` of every anchor tag, in source order.
#[must_use]
pub fn scan_links(html: &str) -> Vec<LinkMatch> {
    LINK_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let value = caps.get(2)?;
            Some(LinkMatch {
                span: value.range(),
                reference: Reference::classify(value.as_str()),
            })
        })
        .collect()
}

/// Remove `<a class="headerlink" ...>¶</a>` permalinks.
#[must_use]
pub fn strip_permanent_links(html: &str) -> Cow<'_, str> {
    PERMALINK_RE.replace_all(html, "")
}

/// Resolve a reference found in `current` to its canonical target.
///
/// Returns `None` for external references, which are never rewritten.
///
/// References are relative to the document's own URL (`guide/intro/`),
/// but [`resolve_from_directory`] expects the document name stripped. The
/// name is stripped when `current` is the default document (which lives at
/// the root) or when the reference climbs with `../`.
#[must_use]
pub fn resolve_target(
    current: &DocumentId,
    reference: &Reference,
    default_document: &DocumentId,
) -> Option<ResolvedTarget> {
    match reference {
        Reference::External(_) => None,
        Reference::Anchor(anchor) => Some(ResolvedTarget::new(current.as_str(), Some(anchor))),
        Reference::Relative { path, anchor } => {
            let directory = if current == default_document || path.starts_with("../") {
                current.directory()
            } else {
                current.as_str()
            };
            let resolved = resolve_from_directory(directory, path);
            Some(ResolvedTarget {
                document: normalize_document(&resolved),
                anchor: anchor.clone(),
            })
        }
    }
}

/// Escape every `&` of a URL exactly once.
///
/// Already escaped `&amp;` is unescaped first, so applying this twice gives
/// the same result as applying it once.
#[must_use]
pub fn normalize_ampersands(url: &str) -> String {
    url.replace("&amp;", "&").replace('&', "&amp;")
}

/// Apply [`normalize_ampersands`] to every `href` attribute.
#[must_use]
pub fn normalize_href_ampersands(html: &str) -> String {
    HREF_RE
        .replace_all(html, |caps: &regex::Captures| {
            format!(r#" href="{}""#, normalize_ampersands(&caps[1]))
        })
        .into_owned()
}

/// Rewrite every internal link of `html` through `resolver`.
///
/// External links are left untouched. Anchor-only links point into
/// `current`. Returns a new string; `html` is not modified.
pub fn rewrite_links(
    html: &str,
    current: &DocumentId,
    resolver: &dyn LinkResolver,
    options: &LinkOptions,
) -> String {
    let html = if options.keep_permanent_links {
        Cow::Borrowed(html)
    } else {
        strip_permanent_links(html)
    };

    let substitutions: Vec<Substitution> = scan_links(&html)
        .into_iter()
        .filter_map(|link| {
            let target = resolve_target(current, &link.reference, &options.default_document)?;
            let url = normalize_ampersands(&resolver.resolve(&target));
            Some(Substitution::new(link.span, url))
        })
        .collect();

    apply_substitutions(&html, &substitutions)
}
