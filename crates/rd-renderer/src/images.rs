//! Image tag rewriting.
//!
//! Replaces every `<img>` tag of a fragment with the markup produced by an
//! [`ImageRenderer`], after resolving its `src` against the documentation root.

use std::ops::Range;
use std::sync::LazyLock;

use rd_storage::DocumentId;
use regex::Regex;

use crate::attributes::{Attributes, parse_attributes};
use crate::error::RewriteError;
use crate::path::{Reference, resolve_from_directory};
use crate::substitute::{Substitution, apply_substitutions};

/// `<img ...>` / `<img ... />`, attributes possibly spanning lines.
static IMG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img(?P<attributes>\s[^>]*?)?\s*/?>").unwrap());

/// Host collaborator producing the final markup of an image.
///
/// Receives every attribute of the original tag, with `src` already
/// resolved to a path relative to the documentation root.
pub trait ImageRenderer {
    /// Render an image.
    fn render(&self, attributes: &Attributes) -> String;
}

impl<F> ImageRenderer for F
where
    F: Fn(&Attributes) -> String,
{
    fn render(&self, attributes: &Attributes) -> String {
        self(attributes)
    }
}

/// One image tag found by [`scan_images`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageMatch {
    /// Byte range of the whole tag.
    pub span: Range<usize>,
    /// Parsed attributes, `src` as written in the fragment.
    pub attributes: Attributes,
}

/// Result of [`rewrite_images`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageRewrite {
    /// Rewritten HTML. Tags that failed are left unchanged.
    pub html: String,
    /// One entry per tag that could not be rewritten.
    pub errors: Vec<RewriteError>,
}

/// Find every image tag, in source order.
#[must_use]
pub fn scan_images(html: &str) -> Vec<ImageMatch> {
    IMG_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let tag = caps.get(0)?;
            let attributes = caps
                .name("attributes")
                .map(|m| parse_attributes(m.as_str()))
                .unwrap_or_default();
            Some(ImageMatch {
                span: tag.range(),
                attributes,
            })
        })
        .collect()
}

/// Resolve an image `src` found in `current` to a root-relative path.
///
/// The source is relative to the directory holding the document. External
/// URLs and `data:` URIs are returned unchanged.
#[must_use]
pub fn resolve_image_source(current: &DocumentId, src: &str) -> String {
    if src.starts_with("data:") || Reference::classify(src).is_external() {
        return src.to_owned();
    }
    resolve_from_directory(current.directory(), src)
}

/// Rewrite every image tag of `html` through `renderer`.
///
/// A tag without `src` (or with an empty one) is left as-is and reported in
/// [`ImageRewrite::errors`]; the other tags are still rewritten.
pub fn rewrite_images(
    html: &str,
    current: &DocumentId,
    renderer: &dyn ImageRenderer,
) -> ImageRewrite {
    let mut errors = Vec::new();
    let mut substitutions = Vec::new();

    for image in scan_images(html) {
        let tag = &html[image.span.clone()];
        let Some(src) = image.attributes.get("src") else {
            tracing::warn!(document = %current, tag, "Image without src attribute");
            errors.push(RewriteError::MalformedMarkup {
                tag: tag.to_owned(),
            });
            continue;
        };
        if src.trim().is_empty() {
            tracing::warn!(document = %current, tag, "Image with empty src attribute");
            errors.push(RewriteError::InvalidReference {
                tag: tag.to_owned(),
            });
            continue;
        }

        let mut attributes = image.attributes.clone();
        attributes.insert("src".to_owned(), resolve_image_source(current, src));
        substitutions.push(Substitution::new(image.span, renderer.render(&attributes)));
    }

    ImageRewrite {
        html: apply_substitutions(html, &substitutions),
        errors,
    }
}
