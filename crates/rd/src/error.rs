//! CLI error types.

use rd_config::ConfigError;
use rd_site::RenderError;
use rd_storage::DocumentIdError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("Invalid default document: {0}")]
    DefaultDocument(#[from] DocumentIdError),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}
