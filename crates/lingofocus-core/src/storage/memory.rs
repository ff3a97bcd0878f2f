//! In-memory store for tests and simulations.

use std::sync::{Arc, Mutex, MutexGuard};

use super::Store;
use crate::error::{Result, StoreError};
use crate::state::FocusState;

#[derive(Debug, Default)]
struct Inner {
    /// Kept serialized so every load goes through the same round-trip as disk.
    document: Option<String>,
    saves: usize,
    fail_saves: bool,
    fail_loads: bool,
}

/// Cloneable in-memory store. Clones share contents and counters.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `state` (does not count as a save).
    ///
    /// # Errors
    /// Returns an error if the state cannot be serialized.
    pub fn with_state(state: &FocusState) -> Result<Self, StoreError> {
        let store = Self::new();
        store.lock()?.document = Some(serde_json::to_string(state)?);
        Ok(store)
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.lock().map(|inner| inner.saves).unwrap_or(0)
    }

    /// Make subsequent saves fail with [`StoreError::Unavailable`].
    pub fn fail_saves(&self, fail: bool) {
        if let Ok(mut inner) = self.lock() {
            inner.fail_saves = fail;
        }
    }

    /// Make subsequent loads fail with [`StoreError::Unavailable`].
    pub fn fail_loads(&self, fail: bool) {
        if let Ok(mut inner) = self.lock() {
            inner.fail_loads = fail;
        }
    }

    /// Last saved state, decoded.
    pub fn snapshot(&self) -> Option<FocusState> {
        let inner = self.lock().ok()?;
        let document = inner.document.as_deref()?;
        serde_json::from_str(document).ok()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Option<FocusState>, StoreError> {
        let inner = self.lock()?;
        if inner.fail_loads {
            return Err(StoreError::Unavailable("load disabled".into()));
        }
        match inner.document.as_deref() {
            Some(document) => Ok(Some(serde_json::from_str(document)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &FocusState) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.fail_saves {
            return Err(StoreError::Unavailable("save disabled".into()));
        }
        inner.document = Some(serde_json::to_string(state)?);
        inner.saves += 1;
        Ok(())
    }
}
