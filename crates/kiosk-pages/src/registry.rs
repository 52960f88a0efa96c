//! SQLite-backed page registry.

use std::str::FromStr;

use chrono::Utc;
use kiosk_materializer::{MaterializeError, Materializer, TemplateSource, slug_for};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::Page;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
)";

const SELECT_PAGE: &str = "SELECT id, slug, name, created_at FROM pages";

/// Error returned by the page registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    #[error("Slug {0:?} is already taken")]
    SlugTaken(String),

    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Page name cannot be empty")]
    EmptyName,
}

/// Registry of pages and the entry point for creating them.
#[derive(Debug, Clone)]
pub struct PageRegistry {
    pool: SqlitePool,
}

impl PageRegistry {
    /// Open the registry at `url` (e.g. `sqlite://kiosk.db`), creating the
    /// database file and schema when missing.
    pub async fn connect(url: &str) -> Result<Self, RegistryError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // Every connection to an in-memory database is a separate database.
        let max_connections = if url.contains(":memory:") { 1 } else { 4 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the schema when missing.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, RegistryError> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Register a page and materialize its document.
    ///
    /// The slug is `slug` when given, otherwise derived from `name`. The
    /// record is inserted inside a transaction which is committed only after
    /// the document has been written. On any failure the record is rolled
    /// back, so no page exists without a servable document. The original
    /// error is returned even when the rollback itself fails.
    ///
    /// A document already present at the slug's output path (for example one
    /// written by a direct materialization) is overwritten, and is removed if
    /// the final commit fails.
    pub async fn register<S>(
        &self,
        name: &str,
        slug: Option<&str>,
        materializer: &Materializer,
        template: &S,
    ) -> Result<Page, RegistryError>
    where
        S: TemplateSource + ?Sized,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let slug = slug_for(name, slug)?;
        let template = template.read_template()?;

        let mut tx = self.pool.begin().await?;
        let created_at = Utc::now();
        let result = sqlx::query("INSERT INTO pages (slug, name, created_at) VALUES (?, ?, ?)")
            .bind(&slug)
            .bind(name)
            .bind(created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| slug_conflict(e, &slug))?;

        let page = Page {
            id: result.last_insert_rowid(),
            slug,
            name: name.to_owned(),
            created_at,
        };

        if let Err(err) = materializer.materialize(&page.identity(), &template) {
            match tx.rollback().await {
                Ok(()) => tracing::warn!(slug = %page.slug, "Page registration rolled back: {err}"),
                Err(rollback_err) => {
                    tracing::error!(slug = %page.slug, "Failed to roll back page registration: {rollback_err}");
                }
            }
            return Err(err.into());
        }

        if let Err(err) = tx.commit().await {
            if let Err(discard_err) = materializer.discard(&page.slug) {
                tracing::warn!(slug = %page.slug, "Failed to remove orphaned page: {discard_err}");
            }
            return Err(err.into());
        }

        tracing::info!(id = page.id, slug = %page.slug, "Registered page");
        Ok(page)
    }

    /// All pages ordered by id.
    pub async fn list(&self) -> Result<Vec<Page>, RegistryError> {
        let pages = sqlx::query_as::<_, Page>(&format!("{SELECT_PAGE} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(pages)
    }

    /// Look up a page by id.
    pub async fn get(&self, id: i64) -> Result<Option<Page>, RegistryError> {
        let page = sqlx::query_as::<_, Page>(&format!("{SELECT_PAGE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    /// Look up a page by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Page>, RegistryError> {
        let page = sqlx::query_as::<_, Page>(&format!("{SELECT_PAGE} WHERE slug = ?"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    /// Materialize the documents of existing pages again.
    ///
    /// Regenerates the page with `slug`, or every page when `slug` is `None`.
    /// Stops at the first failure. Returns the regenerated pages.
    pub async fn regenerate<S>(
        &self,
        slug: Option<&str>,
        materializer: &Materializer,
        template: &S,
    ) -> Result<Vec<Page>, RegistryError>
    where
        S: TemplateSource + ?Sized,
    {
        let pages = match slug {
            Some(slug) => {
                let page = self
                    .get_by_slug(slug)
                    .await?
                    .ok_or_else(|| RegistryError::NotFound(slug.to_owned()))?;
                vec![page]
            }
            None => self.list().await?,
        };

        let template = template.read_template()?;
        for page in &pages {
            materializer.materialize(&page.identity(), &template)?;
        }

        tracing::info!(count = pages.len(), "Regenerated pages");
        Ok(pages)
    }
}

/// Map a unique constraint violation on insert to [`RegistryError::SlugTaken`].
fn slug_conflict(err: sqlx::Error, slug: &str) -> RegistryError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            RegistryError::SlugTaken(slug.to_owned())
        }
        other => RegistryError::Database(other),
    }
}
