//! Page materializer: renders a page document and stores it on disk.
//!
//! Generated documents live one directory below the template:
//!
//! ```text
//! {root}/
//! +-- index.html                 # canonical template
//! +-- nowa-strona/
//!     +-- nowa-strona.html       # generated for slug "nowa-strona"
//! ```
//!
//! Writes go to a temporary file in the target directory which is then
//! renamed over the final path, so readers see either the old or the new
//! document, never a partial one. Two writers racing on the same slug
//! resolve as last-writer-wins.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::render::render;
use crate::slug::validate_slug;
use crate::template::TemplateSource;

/// Identity of a registered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIdentity {
    /// Storage-assigned page id, requested by the document at runtime.
    pub id: i64,
    /// URL and filesystem safe name of the generated document.
    pub slug: String,
    /// Display name.
    pub name: String,
}

/// Error returned by page materialization.
#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("Template is malformed: missing {missing}")]
    TemplateMalformed { missing: &'static str },

    #[error("Invalid slug {0:?}: expected lowercase letters, digits and hyphens")]
    InvalidSlug(String),

    #[error("Invalid page id {0}: must be positive")]
    InvalidPageId(i64),

    #[error("Failed to read template {}: {source}", path.display())]
    TemplateUnreadable { path: PathBuf, source: io::Error },

    #[error("Failed to write {}: {source}", path.display())]
    PersistFailure { path: PathBuf, source: io::Error },
}

/// Generates page documents below a site root.
#[derive(Debug, Clone)]
pub struct Materializer {
    root: PathBuf,
}

impl Materializer {
    /// Create a materializer writing below `root`, the template's directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of the generated document for `slug`.
    #[must_use]
    pub fn output_path(&self, slug: &str) -> PathBuf {
        self.root.join(slug).join(format!("{slug}.html"))
    }

    /// Render `template` for `page` and store the result.
    ///
    /// Returns the generated document. Nothing is written when the slug,
    /// page id or template is invalid.
    pub fn materialize(
        &self,
        page: &PageIdentity,
        template: &str,
    ) -> Result<String, MaterializeError> {
        validate_slug(&page.slug)?;
        let html = render(template, page.id)?;

        let path = self.output_path(&page.slug);
        write_atomic(&path, &html)?;

        tracing::info!(
            page_id = page.id,
            slug = %page.slug,
            name = %page.name,
            path = %path.display(),
            "Materialized page"
        );
        Ok(html)
    }

    /// Read the template from `source`, then [`materialize`](Self::materialize).
    pub fn materialize_from<S>(
        &self,
        page: &PageIdentity,
        source: &S,
    ) -> Result<String, MaterializeError>
    where
        S: TemplateSource + ?Sized,
    {
        let template = source.read_template()?;
        self.materialize(page, &template)
    }

    /// Remove the generated document for `slug`, if any.
    ///
    /// Used to undo a materialization whose registration did not complete.
    /// The slug directory is removed too when it is left empty.
    pub fn discard(&self, slug: &str) -> Result<(), MaterializeError> {
        validate_slug(slug)?;
        let path = self.output_path(slug);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => return Err(MaterializeError::PersistFailure { path, source }),
        }
        if let Some(dir) = path.parent() {
            // Fails harmlessly when the directory holds other files.
            let _ = fs::remove_dir(dir);
        }
        tracing::debug!(slug, "Discarded generated page");
        Ok(())
    }
}

/// Write `contents` to `path` through a temporary file and rename.
fn write_atomic(path: &Path, contents: &str) -> Result<(), MaterializeError> {
    let fail = |source: io::Error| MaterializeError::PersistFailure {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .ok_or_else(|| fail(io::Error::new(io::ErrorKind::InvalidInput, "no parent directory")))?;
    fs::create_dir_all(dir).map_err(fail)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(fail)?;
    tmp.write_all(contents.as_bytes()).map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;

    // Temporary files are created owner-only; generated pages are served
    // by a separate file server.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(fail)?;
    }

    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}
