//! Registered page record.

use chrono::{DateTime, Utc};
use kiosk_materializer::PageIdentity;
use serde::Serialize;

/// A page row from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Page {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Page {
    /// Identity handed to the materializer.
    #[must_use]
    pub fn identity(&self) -> PageIdentity {
        PageIdentity {
            id: self.id,
            slug: self.slug.clone(),
            name: self.name.clone(),
        }
    }
}
