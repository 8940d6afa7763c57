//! Catalog persistence: the mirror port, the document codec and the store.

pub mod box_mirror;
pub mod document;
pub mod mirror;
pub mod store;

#[cfg(test)]
pub(crate) mod memory;

pub use box_mirror::BoxCatalogMirror;
pub use mirror::CatalogMirror;
pub use store::{CatalogStore, FlushReport};
