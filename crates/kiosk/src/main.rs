//! kiosk CLI - static page generator for the content panel.
//!
//! Provides commands for:
//! - `generate`: Generate one page document from the template
//! - `slug`: Show the slug derived from a page name
//! - `pages create`: Register a page and generate its document
//! - `pages list`: List registered pages
//! - `pages regenerate`: Generate documents of registered pages again

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{GenerateArgs, PagesCommand, SlugArgs};
use error::CliError;
use output::Output;

/// kiosk - static page generator.
#[derive(Parser)]
#[command(name = "kiosk", version, about)]
struct Cli {
    /// Enable verbose output (show generation logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a page document from the template.
    Generate(GenerateArgs),
    /// Show the slug derived from a page name.
    Slug(SlugArgs),
    /// Page registry commands.
    #[command(subcommand)]
    Pages(PagesCommand),
}

impl Commands {
    fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Generate(args) => args.execute(),
            Self::Slug(args) => args.execute(),
            Self::Pages(cmd) => cmd.execute(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.command.execute() {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
