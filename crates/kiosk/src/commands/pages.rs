//! `kiosk pages` subcommand group.

use clap::{Args, Subcommand};
use kiosk_pages::PageRegistry;

use super::{SiteArgs, site};
use crate::error::CliError;
use crate::output::Output;

/// Page registry commands.
#[derive(Subcommand)]
pub(crate) enum PagesCommand {
    /// Register a new page and generate its document.
    Create(CreateArgs),
    /// List registered pages.
    List(ListArgs),
    /// Generate documents of registered pages again.
    Regenerate(RegenerateArgs),
}

impl PagesCommand {
    /// Execute the pages subcommand.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let rt = tokio::runtime::Runtime::new()?;
        match self {
            Self::Create(args) => rt.block_on(args.execute()),
            Self::List(args) => rt.block_on(args.execute()),
            Self::Regenerate(args) => rt.block_on(args.execute()),
        }
    }
}

/// Arguments for the pages create command.
#[derive(Args)]
pub(crate) struct CreateArgs {
    /// Display name of the page.
    name: String,

    /// Slug for the page (default: derived from the name).
    #[arg(long)]
    slug: Option<String>,

    #[command(flatten)]
    site: SiteArgs,
}

impl CreateArgs {
    async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config()?;
        let (materializer, template) = site(&config);
        let registry = PageRegistry::connect(&config.database.url).await?;

        let page = registry
            .register(&self.name, self.slug.as_deref(), &materializer, &template)
            .await?;

        output.success(&format!(
            "Created page {} ({}) at {}",
            page.id,
            page.slug,
            materializer.output_path(&page.slug).display()
        ));
        Ok(())
    }
}

/// Arguments for the pages list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Print pages as JSON.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    site: SiteArgs,
}

impl ListArgs {
    async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config()?;
        let registry = PageRegistry::connect(&config.database.url).await?;
        let pages = registry.list().await?;

        if self.json {
            output.data(&serde_json::to_string_pretty(&pages)?);
            return Ok(());
        }

        if pages.is_empty() {
            output.info("No pages registered");
            return Ok(());
        }
        for page in &pages {
            output.data(&format!("{}\t{}\t{}", page.id, page.slug, page.name));
        }
        output.detail(&format!("{} page(s)", pages.len()));
        Ok(())
    }
}

/// Arguments for the pages regenerate command.
#[derive(Args)]
pub(crate) struct RegenerateArgs {
    /// Slug of the page to regenerate (default: all pages).
    slug: Option<String>,

    #[command(flatten)]
    site: SiteArgs,
}

impl RegenerateArgs {
    async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config()?;
        let (materializer, template) = site(&config);
        let registry = PageRegistry::connect(&config.database.url).await?;

        let pages = registry
            .regenerate(self.slug.as_deref(), &materializer, &template)
            .await?;

        for page in &pages {
            output.detail(&format!(
                "  {}",
                materializer.output_path(&page.slug).display()
            ));
        }
        output.success(&format!("Regenerated {} page(s)", pages.len()));
        Ok(())
    }
}
