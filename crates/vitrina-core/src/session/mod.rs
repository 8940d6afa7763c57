//! Product wizard sessions.

pub mod draft;
pub mod registry;
pub mod wizard;

pub use draft::ProductDraft;
pub use registry::{SessionRegistry, spawn_idle_sweeper};
pub use wizard::{CatalogSession, Transition, WizardInput};
