//! Link and image rewriting for Sphinx JSON fragments.
//!
//! The generator writes links and image sources relative to the document
//! they appear in. This crate turns them into canonical targets and hands
//! them to host collaborators:
//!
//! - [`LinkResolver`]: maps a [`ResolvedTarget`] to a host URL
//! - [`ImageRenderer`]: maps resolved `<img>` attributes to host markup
//!
//! # Architecture
//!
//! Every rewrite runs in two phases. A scanning pass ([`scan_links`],
//! [`scan_images`]) yields the span of each match together with what was
//! found there; a substitution pass ([`apply_substitutions`]) splices the
//! collaborator results back into the original text by span, in source order.
//!
//! # Example
//!
//! ```
//! use rd_renderer::{LinkOptions, ResolvedTarget, rewrite_links};
//! use rd_storage::DocumentId;
//!
//! let current = DocumentId::parse("guide/intro/").unwrap();
//! let html = r#"<a class="reference" href="../setup/">Setup</a>"#;
//! let out = rewrite_links(html, &current, &|t: &ResolvedTarget| format!("/docs/{t}"), &LinkOptions::default());
//! assert_eq!(out, r#"<a class="reference" href="/docs/guide/setup/">Setup</a>"#);
//! ```

mod attributes;
mod error;
mod images;
mod links;
mod path;
mod substitute;

pub use attributes::{Attributes, parse_attributes};
pub use error::RewriteError;
pub use images::{ImageMatch, ImageRenderer, ImageRewrite, resolve_image_source, rewrite_images, scan_images};
pub use links::{
    LinkMatch, LinkOptions, LinkResolver, normalize_ampersands, normalize_href_ampersands,
    resolve_target, rewrite_links, scan_links, strip_permanent_links,
};
pub use path::{Reference, ResolvedTarget, normalize_document, resolve_from_directory, resolve_relative};
pub use substitute::{Substitution, apply_substitutions};
