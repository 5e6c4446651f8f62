//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod render;

pub(crate) use check::CheckArgs;
pub(crate) use render::RenderArgs;

use std::sync::Arc;

use rd_config::Config;
use rd_site::{Site, SiteConfig};
use rd_storage::{DocumentId, FsStorage};

use crate::error::CliError;

/// Build a [`Site`] over the configured documentation root.
pub(crate) fn site_from_config(config: &Config) -> Result<Site, CliError> {
    let storage = FsStorage::new(config.docs_resolved.root.clone());
    let site_config = SiteConfig {
        default_document: DocumentId::from_name(&config.docs_resolved.default_document)?,
        keep_permanent_links: config.render.keep_permanent_links,
        xhtml_toc: config.render.xhtml_toc,
    };
    Ok(Site::new(Arc::new(storage), site_config))
}
