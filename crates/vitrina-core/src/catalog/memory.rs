//! In-memory `CatalogMirror` fake with scripted failures, shared by the
//! store and bot tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use vitrina_types::error::SyncError;

use super::mirror::CatalogMirror;

/// Git-like model: a working file, a committed head and a remote tip.
#[derive(Debug, Default)]
pub struct MirrorState {
    pub working: Option<String>,
    pub head: Option<String>,
    pub remote: Option<String>,
    pub unpushed: bool,
    pub commits: usize,
    pub pushes: usize,
    pub resets: usize,
    pub sync_failures: VecDeque<SyncError>,
    pub push_failures: VecDeque<SyncError>,
    pub fail_write: bool,
}

#[derive(Debug)]
pub struct MemoryMirror {
    pub state: Mutex<MirrorState>,
    remote_configured: bool,
    busy: AtomicBool,
    pub overlaps: AtomicUsize,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MirrorState::default()),
            remote_configured: true,
            busy: AtomicBool::new(false),
            overlaps: AtomicUsize::new(0),
        }
    }

    pub fn local_only() -> Self {
        Self {
            remote_configured: false,
            ..Self::new()
        }
    }

    /// Seed the remote (and a fresh clone of it) with `doc`.
    pub fn with_remote_document(self, doc: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.remote = Some(doc.to_string());
            state.head = Some(doc.to_string());
            state.working = Some(doc.to_string());
        }
        self
    }

    pub fn remote_document(&self) -> Option<String> {
        self.state.lock().unwrap().remote.clone()
    }

    pub fn working_document(&self) -> Option<String> {
        self.state.lock().unwrap().working.clone()
    }

    pub fn fail_next_push(&self, times: usize) {
        let mut state = self.state.lock().unwrap();
        for _ in 0..times {
            state
                .push_failures
                .push_back(SyncError::Network("connection reset".into()));
        }
    }

    pub fn fail_next_sync(&self, error: SyncError) {
        self.state.lock().unwrap().sync_failures.push_back(error);
    }

    /// Flag overlapping calls, then yield so a concurrent caller would get a
    /// chance to interleave.
    async fn enter(&self) {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        tokio::task::yield_now().await;
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl CatalogMirror for MemoryMirror {
    async fn sync(&self) -> Result<(), SyncError> {
        self.enter().await;
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.sync_failures.pop_front() {
            return Err(err);
        }
        if !state.unpushed {
            state.head = state.remote.clone();
            state.working = state.remote.clone();
        }
        Ok(())
    }

    async fn reset_to_remote(&self) -> Result<(), SyncError> {
        self.enter().await;
        let mut state = self.state.lock().unwrap();
        state.head = state.remote.clone();
        state.working = state.remote.clone();
        state.unpushed = false;
        state.resets += 1;
        Ok(())
    }

    async fn read_document(&self) -> Result<Option<String>, SyncError> {
        self.enter().await;
        Ok(self.state.lock().unwrap().working.clone())
    }

    async fn write_document(&self, contents: &str) -> Result<(), SyncError> {
        self.enter().await;
        let mut state = self.state.lock().unwrap();
        if state.fail_write {
            return Err(SyncError::Io("disk full".into()));
        }
        state.working = Some(contents.to_string());
        Ok(())
    }

    async fn commit(&self, _message: &str) -> Result<bool, SyncError> {
        self.enter().await;
        let mut state = self.state.lock().unwrap();
        if state.working == state.head {
            return Ok(false);
        }
        state.head = state.working.clone();
        state.unpushed = true;
        state.commits += 1;
        Ok(true)
    }

    async fn push(&self) -> Result<(), SyncError> {
        self.enter().await;
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.push_failures.pop_front() {
            return Err(err);
        }
        if state.unpushed {
            state.remote = state.head.clone();
            state.unpushed = false;
            state.pushes += 1;
        }
        Ok(())
    }

    fn has_remote(&self) -> bool {
        self.remote_configured
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
