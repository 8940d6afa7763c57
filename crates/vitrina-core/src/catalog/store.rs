//! The process-wide catalog store.
//!
//! `CatalogStore` holds the authoritative product map in memory and mirrors
//! it through a [`CatalogMirror`]. Mutations touch only memory; `flush`
//! renders a snapshot, reconciles the working copy, writes, commits and
//! pushes. Hydrate and flush share one mutex so mirror operations never
//! interleave; the map itself sits behind its own `RwLock`.
//!
//! Conflict policy is last-writer-wins on the whole document: when the
//! working copy cannot be pulled because it diverged (or is not a repository
//! at all) it is reset to the remote tip and then overwritten with the
//! in-memory snapshot.
//!
//! A map that was not loaded from a successful remote sync (the remote was
//! unreachable during `hydrate`) is unseeded. The first flush that reaches
//! the remote merges the remote products it lacks into memory before
//! writing, so an outage at startup never publishes a truncated catalog.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use vitrina_types::error::SyncError;
use vitrina_types::product::{Product, ProductId};
use vitrina_types::reply::FlushOutcome;

use super::document;
use super::mirror::CatalogMirror;

/// Default bound for a single mirror operation.
const DEFAULT_LEG_TIMEOUT: Duration = Duration::from_secs(60);

/// The outcome of the most recent flush, for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushReport {
    pub at: DateTime<Utc>,
    pub outcome: FlushOutcome,
}

/// Serialized state guarded by the flush lock.
#[derive(Debug, Default)]
struct FlushState {
    /// A commit exists locally that has not reached the remote.
    push_pending: bool,
    /// The in-memory map reflects the remote catalog.
    seeded: bool,
    last: Option<FlushReport>,
}

#[derive(Debug, Default)]
struct Catalog {
    products: HashMap<ProductId, Product>,
    /// Ids deleted since the last seeded flush; not resurrected by a merge.
    deleted: HashSet<ProductId>,
}

pub struct CatalogStore<M: CatalogMirror> {
    mirror: M,
    catalog: RwLock<Catalog>,
    flush_state: Mutex<FlushState>,
    leg_timeout: Duration,
}

impl<M: CatalogMirror> CatalogStore<M> {
    pub fn new(mirror: M) -> Self {
        // Without a remote the local document is the whole truth.
        let seeded = !mirror.has_remote();
        Self {
            mirror,
            catalog: RwLock::new(Catalog::default()),
            flush_state: Mutex::new(FlushState {
                seeded,
                ..FlushState::default()
            }),
            leg_timeout: DEFAULT_LEG_TIMEOUT,
        }
    }

    /// Bound every individual mirror operation by `timeout`.
    pub fn with_leg_timeout(mut self, timeout: Duration) -> Self {
        self.leg_timeout = timeout;
        self
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    // -----------------------------------------------------------------------
    // Hydration
    // -----------------------------------------------------------------------

    /// Load the catalog from the mirror, replacing the in-memory map.
    ///
    /// Tries to bring the working copy up to date first. Any failure degrades
    /// to whatever document is already on disk, or an empty catalog; nothing
    /// here is returned as an error.
    pub async fn hydrate(&self) -> Vec<Product> {
        let mut state = self.flush_state.lock().await;
        let mut seeded = !self.mirror.has_remote();

        if self.mirror.has_remote() {
            match self.retry_once("pull", || self.mirror.sync()).await {
                Ok(()) => {
                    seeded = true;
                    tracing::info!(mirror = %self.mirror.describe(), "catalog working copy up to date");
                }
                Err(SyncError::NotARepository(path)) => {
                    tracing::warn!(%path, "no usable working copy, cloning from remote");
                    match self.retry_once("clone", || self.mirror.reset_to_remote()).await {
                        Ok(()) => seeded = true,
                        Err(e) => tracing::warn!(error = %e, "clone failed, starting from local state"),
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not update working copy, using local mirror");
                }
            }
        }

        let contents = match self.bounded("read", self.mirror.read_document()).await {
            Ok(contents) => contents,
            Err(e) => {
                tracing::error!(error = %e, "could not read catalog document, starting empty");
                None
            }
        };

        if contents.is_none() {
            tracing::info!("no catalog document yet, starting empty");
        }
        let products = decode_products(contents.as_deref());

        let mut catalog = self.catalog.write().await;
        catalog.products.clear();
        catalog.deleted.clear();
        for product in &products {
            if catalog
                .products
                .insert(product.id.clone(), product.clone())
                .is_some()
            {
                tracing::warn!(product_id = %product.id, "duplicate product id, keeping the later entry");
            }
        }
        state.seeded = seeded;
        if seeded {
            tracing::info!(count = catalog.products.len(), "catalog hydrated");
        } else {
            tracing::warn!(
                count = catalog.products.len(),
                "catalog hydrated without the remote; remote products will be merged on the next successful sync"
            );
        }

        let mut loaded: Vec<Product> = catalog.products.values().cloned().collect();
        document::sort_newest_first(&mut loaded);
        loaded
    }

    // -----------------------------------------------------------------------
    // In-memory operations
    // -----------------------------------------------------------------------

    /// All products, newest first.
    pub async fn get_all(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .catalog
            .read()
            .await
            .products
            .values()
            .cloned()
            .collect();
        document::sort_newest_first(&mut products);
        products
    }

    pub async fn get(&self, id: &ProductId) -> Option<Product> {
        self.catalog.read().await.products.get(id).cloned()
    }

    /// Look a product up by 1-based position in the newest-first listing, or
    /// by id.
    pub async fn find(&self, reference: &str) -> Option<Product> {
        let reference = reference.trim();
        if let Ok(position) = reference.parse::<usize>() {
            if position >= 1 {
                return self.get_all().await.into_iter().nth(position - 1);
            }
            return None;
        }
        self.get(&ProductId::from(reference)).await
    }

    /// Insert or replace by id. Returns the replaced product, if any.
    pub async fn upsert(&self, product: Product) -> Option<Product> {
        let mut catalog = self.catalog.write().await;
        tracing::debug!(product_id = %product.id, "upsert");
        catalog.deleted.remove(&product.id);
        catalog.products.insert(product.id.clone(), product)
    }

    /// Apply `edit` to an existing product in place.
    pub async fn update<F>(&self, id: &ProductId, edit: F) -> Option<Product>
    where
        F: FnOnce(&mut Product),
    {
        let mut catalog = self.catalog.write().await;
        let product = catalog.products.get_mut(id)?;
        edit(product);
        Some(product.clone())
    }

    /// Remove by id. Idempotent: deleting a missing id is a no-op.
    pub async fn delete(&self, id: &ProductId) -> Option<Product> {
        let mut catalog = self.catalog.write().await;
        let removed = catalog.products.remove(id);
        if removed.is_some() {
            tracing::debug!(product_id = %id, "delete");
            catalog.deleted.insert(id.clone());
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.catalog.read().await.products.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.catalog.read().await.products.is_empty()
    }

    pub async fn last_flush(&self) -> Option<FlushReport> {
        self.flush_state.lock().await.last.clone()
    }

    // -----------------------------------------------------------------------
    // Flush
    // -----------------------------------------------------------------------

    /// Persist the current catalog and try to publish it.
    ///
    /// Callers queue on the flush lock. The snapshot is taken after the lock
    /// is acquired, so a queued flush always includes every mutation made
    /// before it started. The in-memory map is never rolled back.
    pub async fn flush(&self) -> FlushOutcome {
        let mut state = self.flush_state.lock().await;
        let outcome = self.flush_locked(&mut state).await;

        match &outcome {
            FlushOutcome::Published => tracing::info!(mirror = %self.mirror.describe(), "catalog published"),
            FlushOutcome::Stored => tracing::info!("catalog stored locally (no remote configured)"),
            FlushOutcome::Unchanged => tracing::debug!("catalog unchanged, nothing to publish"),
            FlushOutcome::SavedLocally { reason } => {
                tracing::warn!(%reason, "catalog saved locally, remote sync pending")
            }
            FlushOutcome::Failed { reason } => tracing::error!(%reason, "catalog flush failed"),
        }
        state.last = Some(FlushReport {
            at: Utc::now(),
            outcome: outcome.clone(),
        });
        outcome
    }

    async fn flush_locked(&self, state: &mut FlushState) -> FlushOutcome {
        let remote = self.mirror.has_remote();
        let mut sync_problem = if remote {
            self.reconcile().await.err()
        } else {
            None
        };
        if sync_problem.is_none() && !state.seeded {
            match self.merge_remote_products().await {
                Ok(()) => state.seeded = true,
                Err(e) => sync_problem = Some(e),
            }
        }

        let snapshot: Vec<Product> = {
            let mut catalog = self.catalog.write().await;
            if state.seeded {
                catalog.deleted.clear();
            }
            catalog.products.values().cloned().collect()
        };
        let count = snapshot.len();
        let rendered = match document::encode(snapshot) {
            Ok(rendered) => rendered,
            Err(e) => return FlushOutcome::Failed { reason: e.to_string() },
        };

        if let Err(e) = self.bounded("write", self.mirror.write_document(&rendered)).await {
            return FlushOutcome::Failed { reason: e.to_string() };
        }

        let message = commit_message(Utc::now(), count);
        let changed = match self.bounded("commit", self.mirror.commit(&message)).await {
            Ok(changed) => changed,
            Err(e) => return FlushOutcome::SavedLocally { reason: e.to_string() },
        };

        if !remote {
            return if changed {
                FlushOutcome::Stored
            } else {
                FlushOutcome::Unchanged
            };
        }

        if changed {
            state.push_pending = true;
        }
        if let Some(e) = sync_problem {
            return FlushOutcome::SavedLocally { reason: e.to_string() };
        }

        // Always attempted so a previously failed push goes out now.
        match self.retry_once("push", || self.mirror.push()).await {
            Ok(()) => {
                let published = std::mem::take(&mut state.push_pending);
                if published {
                    FlushOutcome::Published
                } else {
                    FlushOutcome::Unchanged
                }
            }
            Err(e) => FlushOutcome::SavedLocally { reason: e.to_string() },
        }
    }

    /// Pull, falling back to a hard reset when the working copy is unusable.
    async fn reconcile(&self) -> Result<(), SyncError> {
        match self.retry_once("pull", || self.mirror.sync()).await {
            Err(e) if e.needs_reset() => {
                tracing::warn!(
                    error = %e,
                    "resetting working copy to remote tip; remote edits not present in memory will be overwritten"
                );
                self.retry_once("reset", || self.mirror.reset_to_remote()).await
            }
            other => other,
        }
    }

    /// Bring the remote products missing from an unseeded map into memory.
    /// In-memory entries win by id; ids deleted locally stay deleted.
    async fn merge_remote_products(&self) -> Result<(), SyncError> {
        let contents = self.bounded("read", self.mirror.read_document()).await?;
        let remote = decode_products(contents.as_deref());

        let mut catalog = self.catalog.write().await;
        let mut merged = 0usize;
        for product in remote {
            if catalog.deleted.contains(&product.id) {
                continue;
            }
            if let Entry::Vacant(slot) = catalog.products.entry(product.id.clone()) {
                slot.insert(product);
                merged += 1;
            }
        }
        tracing::info!(merged, total = catalog.products.len(), "merged remote catalog into memory");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Run a mirror operation, retrying once if it fails transiently.
    async fn retry_once<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T, SyncError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        match self.bounded(operation, op()).await {
            Err(e) if e.is_transient() => {
                tracing::warn!(operation, error = %e, "transient failure, retrying once");
                self.bounded(operation, op()).await
            }
            other => other,
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, SyncError>>,
    ) -> Result<T, SyncError> {
        match tokio::time::timeout(self.leg_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout {
                operation: operation.to_string(),
                secs: self.leg_timeout.as_secs(),
            }),
        }
    }
}

/// Decode a stored document, logging and degrading instead of failing.
fn decode_products(contents: Option<&str>) -> Vec<Product> {
    match contents.map(document::decode) {
        None => Vec::new(),
        Some(Ok(decoded)) => {
            for id in &decoded.unreadable_prices {
                tracing::warn!(product_id = %id, "unreadable stored price, using 0");
            }
            if decoded.skipped > 0 {
                tracing::warn!(skipped = decoded.skipped, "dropped non-object catalog entries");
            }
            decoded.products
        }
        Some(Err(e)) => {
            tracing::error!(error = %e, "catalog document is corrupt, treating it as empty");
            Vec::new()
        }
    }
}

fn commit_message(now: DateTime<Utc>, count: usize) -> String {
    format!(
        "Actualización automática - {} ({count} productos)",
        now.format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use vitrina_types::price::Price;
    use vitrina_types::product::Category;

    use super::*;
    use crate::catalog::memory::MemoryMirror;

    fn product(name: &str) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_string(),
            price: Price::parse_input("150000").unwrap(),
            description: String::new(),
            sizes: String::new(),
            category: Category::Sneakers,
            primary_media: Some("http://x/a.jpg".into()),
            extra_images: vec![],
            videos: vec![],
            created_at: Utc::now(),
            created_by: Some("Ana".into()),
            extra: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_upsert_get_delete() {
        let store = CatalogStore::new(MemoryMirror::new());
        let p = product("Test Shoe");
        assert!(store.upsert(p.clone()).await.is_none());
        assert_eq!(store.get(&p.id).await, Some(p.clone()));
        assert_eq!(store.len().await, 1);

        assert!(store.delete(&p.id).await.is_some());
        // Idempotent.
        assert!(store.delete(&p.id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_find_by_position_and_id() {
        let store = CatalogStore::new(MemoryMirror::new());
        let mut older = product("Older");
        older.created_at = Utc.timestamp_opt(1_000, 0).unwrap();
        let newer = product("Newer");
        store.upsert(older.clone()).await;
        store.upsert(newer.clone()).await;

        assert_eq!(store.find("1").await.unwrap().name, "Newer");
        assert_eq!(store.find("2").await.unwrap().name, "Older");
        assert!(store.find("3").await.is_none());
        assert!(store.find("0").await.is_none());
        assert_eq!(store.find(older.id.as_str()).await.unwrap().name, "Older");
    }

    #[tokio::test]
    async fn test_flush_then_hydrate_round_trip() {
        let store = CatalogStore::new(MemoryMirror::new());
        let mut a = product("Air Max");
        a.extra_images = vec!["http://x/b.jpg".into()];
        a.videos = vec!["http://x/v.mp4".into()];
        let b = product("Camiseta");
        store.upsert(a.clone()).await;
        store.upsert(b.clone()).await;

        assert_eq!(store.flush().await, FlushOutcome::Published);
        let remote = store.mirror().remote_document().unwrap();

        let fresh = CatalogStore::new(MemoryMirror::new().with_remote_document(&remote));
        let loaded = fresh.hydrate().await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(fresh.get(&a.id).await, Some(a));
        assert_eq!(fresh.get(&b.id).await, Some(b));
    }

    #[tokio::test]
    async fn test_flush_without_changes_is_unchanged() {
        let store = CatalogStore::new(MemoryMirror::new());
        store.upsert(product("Gorra")).await;
        assert_eq!(store.flush().await, FlushOutcome::Published);
        assert_eq!(store.flush().await, FlushOutcome::Unchanged);
        assert_eq!(store.mirror().state.lock().unwrap().commits, 1);
    }

    #[tokio::test]
    async fn test_push_failure_keeps_data_and_retries_later() {
        let store = CatalogStore::new(MemoryMirror::new());
        let p = product("Test Shoe");
        store.upsert(p.clone()).await;

        // Both the first attempt and the automatic retry fail.
        store.mirror().fail_next_push(2);
        let outcome = store.flush().await;
        assert!(matches!(outcome, FlushOutcome::SavedLocally { .. }));
        assert!(store.get(&p.id).await.is_some());
        let local = store.mirror().working_document().unwrap();
        assert!(local.contains(p.id.as_str()));
        assert!(store.mirror().remote_document().is_none());

        // Next flush has no new bytes but still pushes the pending commit.
        assert_eq!(store.flush().await, FlushOutcome::Published);
        let remote = store.mirror().remote_document().unwrap();
        assert!(remote.contains(p.id.as_str()));
    }

    #[tokio::test]
    async fn test_single_transient_push_failure_is_retried() {
        let store = CatalogStore::new(MemoryMirror::new());
        store.upsert(product("Test Shoe")).await;
        store.mirror().fail_next_push(1);
        assert_eq!(store.flush().await, FlushOutcome::Published);
    }

    #[tokio::test]
    async fn test_diverged_working_copy_is_reset_and_overwritten() {
        let store = CatalogStore::new(MemoryMirror::new().with_remote_document("[]\n"));
        store.hydrate().await;
        let p = product("Test Shoe");
        store.upsert(p.clone()).await;

        store
            .mirror()
            .fail_next_sync(SyncError::Diverged("non-fast-forward".into()));
        assert_eq!(store.flush().await, FlushOutcome::Published);
        assert_eq!(store.mirror().state.lock().unwrap().resets, 1);
        assert!(store.mirror().remote_document().unwrap().contains(p.id.as_str()));
    }

    #[tokio::test]
    async fn test_network_failure_on_pull_saves_locally() {
        let store = CatalogStore::new(MemoryMirror::new());
        store.upsert(product("Test Shoe")).await;
        store
            .mirror()
            .fail_next_sync(SyncError::Network("unreachable".into()));
        store
            .mirror()
            .fail_next_sync(SyncError::Network("unreachable".into()));
        let outcome = store.flush().await;
        assert!(matches!(outcome, FlushOutcome::SavedLocally { .. }));
        assert!(store.mirror().working_document().is_some());
        assert_eq!(store.mirror().state.lock().unwrap().pushes, 0);
    }

    #[tokio::test]
    async fn test_write_failure_is_failed() {
        let store = CatalogStore::new(MemoryMirror::new());
        let p = product("Test Shoe");
        store.upsert(p.clone()).await;
        store.mirror().state.lock().unwrap().fail_write = true;
        assert!(matches!(store.flush().await, FlushOutcome::Failed { .. }));
        // Never rolled back.
        assert!(store.get(&p.id).await.is_some());
        assert!(matches!(
            store.last_flush().await.unwrap().outcome,
            FlushOutcome::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn test_local_only_mirror_reports_stored() {
        let store = CatalogStore::new(MemoryMirror::local_only());
        store.upsert(product("Test Shoe")).await;
        assert_eq!(store.flush().await, FlushOutcome::Stored);
        assert_eq!(store.flush().await, FlushOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_concurrent_flushes_lose_no_update() {
        let store = Arc::new(CatalogStore::new(MemoryMirror::new()));
        let a = product("First");
        let b = product("Second");

        let s1 = Arc::clone(&store);
        let pa = a.clone();
        let t1 = tokio::spawn(async move {
            s1.upsert(pa).await;
            s1.flush().await
        });
        let s2 = Arc::clone(&store);
        let pb = b.clone();
        let t2 = tokio::spawn(async move {
            s2.upsert(pb).await;
            s2.flush().await
        });
        let (r1, r2) = (t1.await.unwrap(), t2.await.unwrap());
        assert!(r1.is_durable() && !r1.is_pending());
        assert!(r2.is_durable() && !r2.is_pending());

        let remote = store.mirror().remote_document().unwrap();
        assert!(remote.contains(a.id.as_str()));
        assert!(remote.contains(b.id.as_str()));
        assert_eq!(store.mirror().overlaps.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_hydrate_corrupt_document_starts_empty() {
        let store = CatalogStore::new(MemoryMirror::new().with_remote_document("{not json"));
        assert!(store.hydrate().await.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_hydrate_falls_back_to_local_on_network_error() {
        let mirror = MemoryMirror::new().with_remote_document(
            r#"[{"id": "producto_1700000000", "nombre": "Nike", "precio": "250000"}]"#,
        );
        mirror.fail_next_sync(SyncError::Network("down".into()));
        mirror.fail_next_sync(SyncError::Network("down".into()));
        let store = CatalogStore::new(mirror);
        let loaded = store.hydrate().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Nike");
    }

    #[tokio::test]
    async fn test_outage_at_startup_keeps_remote_products() {
        let one = product("Existing One");
        let two = product("Existing Two");
        let doc = document::encode(vec![one.clone(), two.clone()]).unwrap();
        let mirror = MemoryMirror::new().with_remote_document(&doc);
        {
            // Nothing cloned yet, and the remote is unreachable at boot.
            let mut state = mirror.state.lock().unwrap();
            state.working = None;
            state.head = None;
        }
        mirror.fail_next_sync(SyncError::Network("down".into()));
        mirror.fail_next_sync(SyncError::Network("down".into()));
        let store = CatalogStore::new(mirror);
        assert!(store.hydrate().await.is_empty());

        let new = product("New One");
        store.upsert(new.clone()).await;
        assert_eq!(store.flush().await, FlushOutcome::Published);

        let remote = store.mirror().remote_document().unwrap();
        for p in [&one, &two, &new] {
            assert!(remote.contains(p.id.as_str()), "{} missing from remote", p.name);
        }
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_unseeded_merge_keeps_local_edits_and_deletions() {
        let kept = product("Kept");
        let removed = product("Removed");
        let mut edited = product("Before");
        let added_remotely = product("Added Remotely");
        let stale = document::encode(vec![kept.clone(), removed.clone(), edited.clone()]).unwrap();
        let current = document::encode(vec![
            kept.clone(),
            removed.clone(),
            edited.clone(),
            added_remotely.clone(),
        ])
        .unwrap();

        let mirror = MemoryMirror::new().with_remote_document(&current);
        mirror.state.lock().unwrap().working = Some(stale);
        mirror.fail_next_sync(SyncError::Network("down".into()));
        mirror.fail_next_sync(SyncError::Network("down".into()));
        let store = CatalogStore::new(mirror);
        assert_eq!(store.hydrate().await.len(), 3);

        store.delete(&removed.id).await;
        edited.name = "After".into();
        store.upsert(edited.clone()).await;
        assert_eq!(store.flush().await, FlushOutcome::Published);

        assert!(store.get(&removed.id).await.is_none());
        assert_eq!(store.get(&edited.id).await.unwrap().name, "After");
        assert!(store.get(&added_remotely.id).await.is_some());
        let remote = store.mirror().remote_document().unwrap();
        assert!(!remote.contains(removed.id.as_str()));
        assert!(remote.contains(added_remotely.id.as_str()));
        assert!(remote.contains("After"));
    }

    #[tokio::test]
    async fn test_slow_mirror_leg_times_out() {
        struct StallingPush(MemoryMirror);
        impl CatalogMirror for StallingPush {
            async fn sync(&self) -> Result<(), SyncError> {
                self.0.sync().await
            }
            async fn reset_to_remote(&self) -> Result<(), SyncError> {
                self.0.reset_to_remote().await
            }
            async fn read_document(&self) -> Result<Option<String>, SyncError> {
                self.0.read_document().await
            }
            async fn write_document(&self, contents: &str) -> Result<(), SyncError> {
                self.0.write_document(contents).await
            }
            async fn commit(&self, message: &str) -> Result<bool, SyncError> {
                self.0.commit(message).await
            }
            async fn push(&self) -> Result<(), SyncError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
            fn has_remote(&self) -> bool {
                true
            }
            fn describe(&self) -> String {
                "stalling".into()
            }
        }

        tokio::time::pause();
        let store = CatalogStore::new(StallingPush(MemoryMirror::new()))
            .with_leg_timeout(Duration::from_secs(5));
        store.upsert(product("Slow")).await;
        match store.flush().await {
            FlushOutcome::SavedLocally { reason } => assert!(reason.contains("timed out")),
            other => panic!("expected SavedLocally, got {other:?}"),
        }
    }

    #[test]
    fn test_commit_message_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap();
        assert_eq!(
            commit_message(at, 3),
            "Actualización automática - 2024-05-01 10:30:00 (3 productos)"
        );
    }
}
