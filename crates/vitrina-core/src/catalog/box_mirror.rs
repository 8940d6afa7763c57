//! BoxCatalogMirror -- object-safe dynamic dispatch wrapper for CatalogMirror.
//!
//! Same blanket-impl pattern as `BoxMediaExternalizer`: an object-safe
//! `CatalogMirrorDyn` with boxed futures, implemented for every
//! `CatalogMirror`, wrapped by `BoxCatalogMirror` which delegates.

use std::future::Future;
use std::pin::Pin;

use vitrina_types::error::SyncError;

use super::mirror::CatalogMirror;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SyncError>> + Send + 'a>>;

/// Object-safe version of [`CatalogMirror`].
pub trait CatalogMirrorDyn: Send + Sync {
    fn sync_boxed(&self) -> BoxFuture<'_, ()>;
    fn reset_to_remote_boxed(&self) -> BoxFuture<'_, ()>;
    fn read_document_boxed(&self) -> BoxFuture<'_, Option<String>>;
    fn write_document_boxed<'a>(&'a self, contents: &'a str) -> BoxFuture<'a, ()>;
    fn commit_boxed<'a>(&'a self, message: &'a str) -> BoxFuture<'a, bool>;
    fn push_boxed(&self) -> BoxFuture<'_, ()>;
    fn has_remote_dyn(&self) -> bool;
    fn describe_dyn(&self) -> String;
}

impl<T: CatalogMirror> CatalogMirrorDyn for T {
    fn sync_boxed(&self) -> BoxFuture<'_, ()> {
        Box::pin(self.sync())
    }

    fn reset_to_remote_boxed(&self) -> BoxFuture<'_, ()> {
        Box::pin(self.reset_to_remote())
    }

    fn read_document_boxed(&self) -> BoxFuture<'_, Option<String>> {
        Box::pin(self.read_document())
    }

    fn write_document_boxed<'a>(&'a self, contents: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(self.write_document(contents))
    }

    fn commit_boxed<'a>(&'a self, message: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(self.commit(message))
    }

    fn push_boxed(&self) -> BoxFuture<'_, ()> {
        Box::pin(self.push())
    }

    fn has_remote_dyn(&self) -> bool {
        self.has_remote()
    }

    fn describe_dyn(&self) -> String {
        self.describe()
    }
}

/// Type-erased mirror, so the git-backed or local-only adapter can be picked
/// at runtime from configuration.
pub struct BoxCatalogMirror {
    inner: Box<dyn CatalogMirrorDyn>,
}

impl BoxCatalogMirror {
    pub fn new<T: CatalogMirror + 'static>(mirror: T) -> Self {
        Self {
            inner: Box::new(mirror),
        }
    }
}

impl CatalogMirror for BoxCatalogMirror {
    async fn sync(&self) -> Result<(), SyncError> {
        self.inner.sync_boxed().await
    }

    async fn reset_to_remote(&self) -> Result<(), SyncError> {
        self.inner.reset_to_remote_boxed().await
    }

    async fn read_document(&self) -> Result<Option<String>, SyncError> {
        self.inner.read_document_boxed().await
    }

    async fn write_document(&self, contents: &str) -> Result<(), SyncError> {
        self.inner.write_document_boxed(contents).await
    }

    async fn commit(&self, message: &str) -> Result<bool, SyncError> {
        self.inner.commit_boxed(message).await
    }

    async fn push(&self) -> Result<(), SyncError> {
        self.inner.push_boxed().await
    }

    fn has_remote(&self) -> bool {
        self.inner.has_remote_dyn()
    }

    fn describe(&self) -> String {
        self.inner.describe_dyn()
    }
}
