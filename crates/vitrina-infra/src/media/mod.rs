//! Media host adapters.

pub mod imgbb;

pub use imgbb::ImgbbExternalizer;
