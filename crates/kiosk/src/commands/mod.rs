//! CLI command implementations.

pub(crate) mod generate;
pub(crate) mod pages;
pub(crate) mod slug;

use std::path::PathBuf;

use clap::Args;
use kiosk_config::{CliSettings, Config};
use kiosk_materializer::{FileTemplate, Materializer};

use crate::error::CliError;

pub(crate) use generate::GenerateArgs;
pub(crate) use pages::PagesCommand;
pub(crate) use slug::SlugArgs;

/// Site options shared by commands that generate pages.
#[derive(Args)]
pub(crate) struct SiteArgs {
    /// Path to configuration file (default: auto-discover kiosk.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site root holding the template (overrides config).
    #[arg(long)]
    root: Option<PathBuf>,

    /// Template filename relative to the site root (overrides config).
    #[arg(long)]
    template: Option<String>,

    /// Page registry database URL (overrides config).
    #[arg(long, env = "KIOSK_DATABASE_URL")]
    database_url: Option<String>,
}

impl SiteArgs {
    /// Load configuration with these arguments applied as overrides.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            root: self.root.clone(),
            template: self.template.clone(),
            database_url: self.database_url.clone(),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Materializer and template source for a loaded configuration.
pub(crate) fn site(config: &Config) -> (Materializer, FileTemplate) {
    (
        Materializer::new(&config.site_resolved.root),
        FileTemplate::new(config.site_resolved.template_path()),
    )
}
