//! Infrastructure layer for Vitrina.
//!
//! Contains implementations of the ports defined in `vitrina-core`: the
//! git-backed and local-only catalog mirrors and the imgbb media host. Also
//! provides configuration loading and data directory resolution.

pub mod config;
pub mod filesystem;
pub mod git;
pub mod local;
pub mod media;
