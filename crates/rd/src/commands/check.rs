//! `rd check` command implementation.

use std::path::PathBuf;

use clap::Args;
use rd_config::{CliSettings, Config};
use rd_renderer::{scan_images, scan_links};
use rd_site::LoadedDocument;

use crate::commands::site_from_config;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Document to check, e.g. `guide/intro/` (default: the default document).
    document: Option<String>,

    /// Path to configuration file (default: auto-discover rd.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation root holding the .fjson files (overrides config).
    #[arg(short, long, env = "RD_ROOT")]
    root: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Summary of a loaded document.
#[derive(Debug, PartialEq, Eq)]
struct DocumentReport {
    document: String,
    title: Option<String>,
    fields: Vec<&'static str>,
    internal_links: usize,
    external_links: usize,
    images: usize,
    images_without_src: usize,
    fallback: bool,
}

impl DocumentReport {
    fn new(loaded: &LoadedDocument) -> Self {
        let fragment = &loaded.fragment;
        let present = [
            ("body", fragment.body.is_some()),
            ("toc", fragment.toc.is_some()),
            ("title", fragment.title.is_some()),
            ("prev", fragment.prev.is_some()),
            ("next", fragment.next.is_some()),
            ("parents", !fragment.parents.is_empty()),
            ("genindexentries", fragment.is_general_index()),
        ];

        let body = fragment.body.as_deref().unwrap_or_default();
        let links = scan_links(body);
        let external_links = links.iter().filter(|l| l.reference.is_external()).count();
        let images = scan_images(body);

        Self {
            document: loaded.id.to_string(),
            title: fragment.title.clone(),
            fields: present
                .into_iter()
                .filter_map(|(name, is_present)| is_present.then_some(name))
                .collect(),
            internal_links: links.len() - external_links,
            external_links,
            images: images.len(),
            images_without_src: images
                .iter()
                .filter(|image| image.attributes.get("src").is_none_or(|src| src.trim().is_empty()))
                .count(),
            fallback: loaded.fallback,
        }
    }
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or no document can be loaded.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            root: self.root,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let site = site_from_config(&config)?;

        let loaded = site.load(self.document.as_deref())?;
        let report = DocumentReport::new(&loaded);

        if report.fallback {
            output.warning(&format!(
                "Requested document not available, loaded {}",
                report.document
            ));
        }
        output.success(&format!("Document: {}", report.document));
        output.info(&format!(
            "Title: {}",
            report.title.as_deref().unwrap_or("(none)")
        ));
        output.info(&format!("Fields: {}", report.fields.join(", ")));
        output.info(&format!(
            "Links: {} internal, {} external",
            report.internal_links, report.external_links
        ));
        output.info(&format!("Images: {}", report.images));
        if report.images_without_src > 0 {
            output.warning(&format!(
                "Images without src: {}",
                report.images_without_src
            ));
        }

        Ok(())
    }
}
