//! CLI error types.

use kiosk_config::ConfigError;
use kiosk_materializer::MaterializeError;
use kiosk_pages::RegistryError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Materialize(#[from] MaterializeError),

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
