//! `rd render` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use rd_config::{CliSettings, Config, Mode};
use rd_site::{RenderMode, RenderResult};

use crate::commands::site_from_config;
use crate::error::CliError;
use crate::host::{HtmlImageRenderer, QueryLinkResolver};
use crate::output::Output;

/// Render mode accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Body,
    Toc,
    Title,
    Breadcrumb,
    QuickNavigation,
    Index,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Body => Self::Body,
            ModeArg::Toc => Self::Toc,
            ModeArg::Title => Self::Title,
            ModeArg::Breadcrumb => Self::Breadcrumb,
            ModeArg::QuickNavigation => Self::QuickNavigation,
            ModeArg::Index => Self::Index,
        }
    }
}

/// Map a configured mode to the site render mode.
pub(crate) fn render_mode(mode: Mode) -> RenderMode {
    match mode {
        Mode::Body => RenderMode::Body,
        Mode::Toc => RenderMode::Toc,
        Mode::Title => RenderMode::Title,
        Mode::Breadcrumb => RenderMode::Breadcrumb,
        Mode::QuickNavigation => RenderMode::QuickNavigation,
        Mode::Index => RenderMode::Index,
    }
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Document to render, e.g. `guide/intro/` (default: the default document).
    document: Option<String>,

    /// What to render (overrides config).
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Path to configuration file (default: auto-discover rd.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation root holding the .fjson files (overrides config).
    #[arg(short, long, env = "RD_ROOT")]
    root: Option<PathBuf>,

    /// Default document name (overrides config).
    #[arg(long)]
    default_document: Option<String>,

    /// Keep heading permalinks in the body.
    #[arg(long)]
    keep_permanent_links: bool,

    /// Page URL documents are linked through (overrides config).
    #[arg(long)]
    base_url: Option<String>,

    /// Public URL of the documentation root (overrides config).
    #[arg(long)]
    static_url: Option<String>,

    /// Print the full result as JSON.
    #[arg(long)]
    json: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or no document can be rendered.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            root: self.root,
            default_document: self.default_document,
            mode: self.mode.map(Mode::from),
            keep_permanent_links: self.keep_permanent_links.then_some(true),
            base_url: self.base_url,
            static_url: self.static_url,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let result = render(&config, self.document.as_deref())?;

        if result.fallback {
            output.warning(&format!(
                "Requested document not available, rendered {}",
                result.document
            ));
        }
        for warning in &result.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        let text = if self.json {
            serde_json::to_string_pretty(&result)?
        } else {
            match result.output.as_text() {
                Some(text) => text.to_owned(),
                None => serde_json::to_string_pretty(&result.output)?,
            }
        };
        output.content(&text);

        Ok(())
    }
}

/// Render `document` with the collaborators built from `config`.
pub(crate) fn render(config: &Config, document: Option<&str>) -> Result<RenderResult, CliError> {
    let site = site_from_config(config)?;
    let links = QueryLinkResolver::new(&config.links);
    let images = HtmlImageRenderer::new(&config.links);

    tracing::info!(
        root = %config.docs_resolved.root.display(),
        document = document.unwrap_or_default(),
        mode = ?config.render.mode,
        "Rendering"
    );
    Ok(site.render(document, render_mode(config.render.mode), &links, &images)?)
}
