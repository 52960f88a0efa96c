//! `kiosk generate` command implementation.

use clap::Args;
use kiosk_materializer::PageIdentity;

use super::{SiteArgs, site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Page id the document requests content for.
    #[arg(long)]
    id: i64,

    /// Slug naming the generated directory and file.
    #[arg(long)]
    slug: String,

    /// Display name (default: the slug).
    #[arg(long)]
    name: Option<String>,

    #[command(flatten)]
    site: SiteArgs,
}

impl GenerateArgs {
    /// Materialize a single page without touching the registry.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config()?;
        let (materializer, template) = site(&config);

        output.info(&format!("Template: {}", template.path().display()));

        let page = PageIdentity {
            id: self.id,
            name: self.name.unwrap_or_else(|| self.slug.clone()),
            slug: self.slug,
        };
        materializer.materialize_from(&page, &template)?;

        output.success(&format!(
            "Generated {}",
            materializer.output_path(&page.slug).display()
        ));
        Ok(())
    }
}
