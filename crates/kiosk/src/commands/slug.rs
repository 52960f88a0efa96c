//! `kiosk slug` command implementation.

use clap::Args;
use kiosk_materializer::slug_for;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the slug command.
#[derive(Args)]
pub(crate) struct SlugArgs {
    /// Display name to derive the slug from.
    name: String,
}

impl SlugArgs {
    /// Print the slug a page with this name would get.
    pub(crate) fn execute(&self) -> Result<(), CliError> {
        let slug = slug_for(&self.name, None)?;
        Output::new().data(&slug);
        Ok(())
    }
}
