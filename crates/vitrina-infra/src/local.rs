//! File-only catalog mirror, used when no remote repository is configured.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use vitrina_core::catalog::CatalogMirror;
use vitrina_types::error::SyncError;

use crate::filesystem::{read_optional, write_atomic};

/// Keeps the catalog document in a plain directory. There is nothing to pull
/// or push; `commit` only reports whether the last write changed any bytes.
#[derive(Debug)]
pub struct LocalCatalogMirror {
    path: PathBuf,
    dirty: AtomicBool,
}

impl LocalCatalogMirror {
    pub fn new(dir: &Path, file: &str) -> Self {
        Self {
            path: dir.join(file),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(path: &Path, e: std::io::Error) -> SyncError {
    SyncError::Io(format!("{}: {e}", path.display()))
}

impl CatalogMirror for LocalCatalogMirror {
    async fn sync(&self) -> Result<(), SyncError> {
        Ok(())
    }

    async fn reset_to_remote(&self) -> Result<(), SyncError> {
        Ok(())
    }

    async fn read_document(&self) -> Result<Option<String>, SyncError> {
        read_optional(&self.path)
            .await
            .map_err(|e| io_error(&self.path, e))
    }

    async fn write_document(&self, contents: &str) -> Result<(), SyncError> {
        let previous = read_optional(&self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;
        if previous.as_deref() == Some(contents) {
            return Ok(());
        }
        write_atomic(&self.path, contents)
            .await
            .map_err(|e| io_error(&self.path, e))?;
        self.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn commit(&self, _message: &str) -> Result<bool, SyncError> {
        Ok(self.dirty.swap(false, Ordering::SeqCst))
    }

    async fn push(&self) -> Result<(), SyncError> {
        Ok(())
    }

    fn has_remote(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        format!("local file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use vitrina_core::catalog::CatalogStore;
    use vitrina_types::price::Price;
    use vitrina_types::product::{Category, Product, ProductId};
    use vitrina_types::reply::FlushOutcome;

    use super::*;

    #[tokio::test]
    async fn test_commit_tracks_byte_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = LocalCatalogMirror::new(dir.path(), "productos.json");
        assert!(mirror.read_document().await.unwrap().is_none());

        mirror.write_document("[]\n").await.unwrap();
        assert!(mirror.commit("first").await.unwrap());
        mirror.write_document("[]\n").await.unwrap();
        assert!(!mirror.commit("same").await.unwrap());
        assert!(!mirror.has_remote());
    }

    #[tokio::test]
    async fn test_store_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(LocalCatalogMirror::new(dir.path(), "productos.json"));
        let product = Product {
            id: ProductId::generate(),
            name: "Test Shoe".into(),
            price: Price::parse_input("150000").unwrap(),
            description: String::new(),
            sizes: "38-42".into(),
            category: Category::Sneakers,
            primary_media: Some("http://x/a.jpg".into()),
            extra_images: vec![],
            videos: vec![],
            created_at: chrono::Utc::now(),
            created_by: None,
            extra: Default::default(),
        };
        store.upsert(product.clone()).await;
        assert_eq!(store.flush().await, FlushOutcome::Stored);

        let reopened = CatalogStore::new(LocalCatalogMirror::new(dir.path(), "productos.json"));
        let loaded = reopened.hydrate().await;
        assert_eq!(loaded, vec![product]);
    }
}
