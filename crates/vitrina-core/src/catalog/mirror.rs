//! Port for the versioned copy of the catalog document.
//!
//! A mirror owns one working directory holding the catalog JSON and knows how
//! to reconcile it with a remote repository. The store drives it through
//! [`CatalogMirror`]; infra provides the git-backed and local-only adapters.

use std::future::Future;

use vitrina_types::error::SyncError;

/// Versioned storage for the serialized catalog.
///
/// Calls are never made concurrently: the store holds its flush lock across
/// every sequence of mirror operations. Uses RPITIT like every async trait
/// in this project.
pub trait CatalogMirror: Send + Sync {
    /// Bring the working copy up to date with the remote (clone when absent,
    /// pull when present).
    fn sync(&self) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Discard local history and match the remote tip (fetch + hard reset,
    /// or a fresh clone when the working copy is unusable).
    fn reset_to_remote(&self) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Raw contents of the catalog document, `None` if it does not exist.
    fn read_document(&self) -> impl Future<Output = Result<Option<String>, SyncError>> + Send;

    /// Replace the catalog document atomically.
    fn write_document(&self, contents: &str)
    -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Record the current document. Returns `false` when nothing changed, in
    /// which case no commit is created.
    fn commit(&self, message: &str) -> impl Future<Output = Result<bool, SyncError>> + Send;

    /// Publish committed history. Must be safe to call with nothing pending.
    fn push(&self) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Whether a remote exists at all. Local-only mirrors return `false`.
    fn has_remote(&self) -> bool;

    /// Human description for logs and status output. Never contains secrets.
    fn describe(&self) -> String;
}
