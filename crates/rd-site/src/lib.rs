//! Navigation, general index and render modes for RD.
//!
//! This crate provides:
//! - [`Site`]: loads a requested document (with default-document fallback)
//!   and renders it in a [`RenderMode`]
//! - [`navigation`]: table of contents, previous/next, breadcrumb and quick
//!   navigation built from a fragment's metadata
//! - [`index`]: the general index page
//!
//! Links and images are handed to host collaborators, see
//! [`rd_renderer::LinkResolver`] and [`rd_renderer::ImageRenderer`].

pub mod index;
pub mod navigation;
mod site;

pub use index::{IndexCategory, IndexEntry, IndexLink, parse_index, render_index};
pub use navigation::{BreadcrumbItem, MenuEntry, NavLink, QuickNavigation, Toc, TocOptions};
pub use site::{LoadedDocument, RenderError, RenderMode, RenderOutput, RenderResult, Site, SiteConfig};
