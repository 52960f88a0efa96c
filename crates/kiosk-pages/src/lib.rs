//! Page registry for kiosk.
//!
//! Pages are recorded in SQLite. Registering a page and materializing its
//! document form one unit: if the document cannot be generated, the record
//! is rolled back and the error is returned to the caller.
//!
//! The registry holds no notion of a "current" page. Every operation names
//! the page it acts on.

mod page;
mod registry;

pub use page::Page;
pub use registry::{PageRegistry, RegistryError};
