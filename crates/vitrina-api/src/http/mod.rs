//! Liveness HTTP surface. Hosting platforms probe these to keep the process
//! alive; nothing here mutates the catalog.

pub mod router;
