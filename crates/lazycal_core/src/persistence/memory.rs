//! In-process persistence adapter.
//!
//! Clones share one state, so a test can hand one clone to a saver thread and
//! inspect saves through another.

use crate::persistence::{EventPersistence, PersistError, PersistResult};
use crate::store::event_store::EventSnapshot;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    stored: Option<EventSnapshot>,
    save_count: usize,
    fail_saves: bool,
}

/// Mutex-guarded snapshot holder.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersistence {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent saves fail until switched back.
    pub fn set_fail_saves(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_saves = fail;
        }
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.state.lock().map(|state| state.save_count).unwrap_or(0)
    }

    /// Last successfully saved snapshot.
    pub fn stored(&self) -> Option<EventSnapshot> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.stored.clone())
    }

    fn lock(&self) -> PersistResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| PersistError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl EventPersistence for InMemoryPersistence {
    fn load(&self) -> PersistResult<Option<EventSnapshot>> {
        Ok(self.lock()?.stored.clone())
    }

    fn save(&self, snapshot: &EventSnapshot) -> PersistResult<()> {
        let mut state = self.lock()?;
        if state.fail_saves {
            return Err(PersistError::Unavailable(
                "memory store rejecting saves".to_string(),
            ));
        }
        state.stored = Some(snapshot.clone());
        state.save_count += 1;
        Ok(())
    }
}
