//! Business logic and port traits for Vitrina.
//!
//! This crate defines the ports (`CatalogMirror`, `MediaExternalizer`) that
//! the infrastructure layer implements, plus everything that runs on top of
//! them: the catalog store, the product wizard, the session registry and the
//! bot handler. It depends only on `vitrina-types` -- never on
//! `vitrina-infra` or any git/HTTP crate.

pub mod access;
pub mod bot;
pub mod catalog;
pub mod media;
pub mod quick_add;
pub mod session;
