//! In-memory paste backend for testing.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::backend::PasteBackend;
use crate::error::{StorageError, StorageResult};
use crate::types::PasteRecord;

/// `HashMap` behind a `RwLock`. Each trait method holds the lock for its whole
/// duration, which gives the same atomicity guarantees as [`RedbBackend`](crate::RedbBackend).
#[derive(Default)]
pub struct MemoryBackend {
    pastes: RwLock<HashMap<String, PasteRecord>>,
    simulate_failure: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StorageError::Unavailable`.
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    // A panic while holding the lock cannot leave the map half-updated.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, PasteRecord>> {
        self.pastes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, PasteRecord>> {
        self.pastes.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("simulated failure".to_string()));
        }
        Ok(())
    }
}

impl PasteBackend for MemoryBackend {
    fn insert_new(&self, record: &PasteRecord) -> StorageResult<()> {
        self.check_available()?;
        let mut pastes = self.write();
        match pastes.entry(record.slug.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(record.slug.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    fn fetch(&self, slug: &str) -> StorageResult<Option<PasteRecord>> {
        self.check_available()?;
        Ok(self.read().get(slug).cloned())
    }

    fn record_view(&self, slug: &str) -> StorageResult<Option<PasteRecord>> {
        self.check_available()?;
        let mut pastes = self.write();
        Ok(pastes.get_mut(slug).map(|record| {
            record.views = record.views.saturating_add(1);
            record.clone()
        }))
    }

    fn remove_if_hash(&self, slug: &str, secret_hash: &str) -> StorageResult<bool> {
        self.check_available()?;
        let mut pastes = self.write();
        let matches = pastes
            .get(slug)
            .is_some_and(|record| record.secret_hash == secret_hash);
        if matches {
            pastes.remove(slug);
        }
        Ok(matches)
    }

    fn count(&self) -> StorageResult<u64> {
        self.check_available()?;
        Ok(self.read().len() as u64)
    }
}
