//! Configuration management for RD.
//!
//! Parses `rd.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`]. They take
//! precedence over the file, which takes precedence over defaults.
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `docs.root`
//! - `links.base_url`
//! - `links.static_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override documentation root.
    pub root: Option<PathBuf>,
    /// Override default document name.
    pub default_document: Option<String>,
    /// Override render mode.
    pub mode: Option<Mode>,
    /// Override permanent link stripping.
    pub keep_permanent_links: Option<bool>,
    /// Override page URL used for links.
    pub base_url: Option<String>,
    /// Override public URL of the documentation root.
    pub static_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rd.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (root is a relative string from TOML).
    docs: DocsConfigRaw,
    /// Rendering configuration.
    pub render: RenderConfig,
    /// Link generation configuration.
    pub links: LinksConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    root: Option<String>,
    default_document: Option<String>,
}

/// Resolved documentation configuration.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Directory holding the `.fjson` fragments.
    pub root: PathBuf,
    /// Name of the document served by default, without trailing slash.
    pub default_document: String,
}

/// What the `render` command outputs.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Body,
    Toc,
    Title,
    Breadcrumb,
    QuickNavigation,
    Index,
}

/// Rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Default render mode.
    pub mode: Mode,
    /// Keep heading permalinks in bodies.
    pub keep_permanent_links: bool,
    /// Escape ampersands of TOC links.
    pub xhtml_toc: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Body,
            keep_permanent_links: false,
            xhtml_toc: true,
        }
    }
}

/// Link generation configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Page URL documents are linked through.
    pub base_url: String,
    /// Query parameter carrying the document identifier.
    pub parameter: String,
    /// Public URL of the documentation root, for images and downloads.
    pub static_url: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            parameter: "doc".to_owned(),
            static_url: String::new(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`links.base_url`").
        field: String,
        /// Error message (e.g., "${`DOCS_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `rd.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, then the
    /// result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.root {
            self.docs_resolved.root.clone_from(root);
        }
        if let Some(default_document) = &settings.default_document {
            self.docs_resolved.default_document.clone_from(default_document);
        }
        if let Some(mode) = settings.mode {
            self.render.mode = mode;
        }
        if let Some(keep) = settings.keep_permanent_links {
            self.render.keep_permanent_links = keep;
        }
        if let Some(base_url) = &settings.base_url {
            self.links.base_url.clone_from(base_url);
        }
        if let Some(static_url) = &settings.static_url {
            self.links.static_url.clone_from(static_url);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            render: RenderConfig::default(),
            links: LinksConfig::default(),
            docs_resolved: DocsConfig {
                root: base.join("docs"),
                default_document: "index".to_owned(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_docs()?;
        require_non_empty(&self.links.parameter, "links.parameter")?;
        Ok(())
    }

    fn validate_docs(&self) -> Result<(), ConfigError> {
        let name = &self.docs_resolved.default_document;
        require_non_empty(name, "docs.default_document")?;
        if name.contains("..") {
            return Err(ConfigError::Validation(
                "docs.default_document cannot contain '..'".to_owned(),
            ));
        }
        if name.ends_with('/') {
            return Err(ConfigError::Validation(
                "docs.default_document must be a name without trailing '/'".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref root) = self.docs.root {
            self.docs.root = Some(expand::expand_env(root, "docs.root")?);
        }
        self.links.base_url = expand::expand_env(&self.links.base_url, "links.base_url")?;
        self.links.static_url = expand::expand_env(&self.links.static_url, "links.static_url")?;
        Ok(())
    }

    /// Resolve the documentation root against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            root: config_dir.join(self.docs.root.as_deref().unwrap_or("docs")),
            default_document: self
                .docs
                .default_document
                .clone()
                .unwrap_or_else(|| "index".to_owned()),
        };
    }
}
