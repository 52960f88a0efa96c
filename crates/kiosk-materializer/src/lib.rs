//! Static page generation for kiosk.
//!
//! A page is materialized by deriving a document from the canonical template:
//! the page identifier is declared in `<head>`, root-relative asset references
//! are rewritten for a document served one directory deeper, and the runtime
//! data loader is referenced before `</body>`. The result is written
//! atomically to `{root}/{slug}/{slug}.html`.
//!
//! # Example
//!
//! ```
//! use kiosk_materializer::render;
//!
//! let template = "<html><head><link href=\"/style/style.css\"></head><body></body></html>";
//! let html = render(template, 7).unwrap();
//! assert!(html.contains("href=\"../style/style.css\""));
//! assert!(html.contains("window.PAGE_ID = 7;"));
//! assert!(html.contains("src=\"../js/dataLoader.js\""));
//! ```

mod materializer;
mod render;
mod slug;
mod template;

pub use materializer::{MaterializeError, Materializer, PageIdentity};
pub use render::render;
pub use slug::{normalize_slug, slug_for, validate_slug};
pub use template::{FileTemplate, TemplateSource};
