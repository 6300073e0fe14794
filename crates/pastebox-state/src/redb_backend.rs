//! RedbBackend: redb-backed paste persistence.
//!
//! Every mutating operation runs in its own write transaction. redb admits one
//! write transaction at a time, so insert-if-absent, read-and-increment and
//! compare-and-delete are each atomic with respect to every other writer.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata};
use tracing::debug;

use crate::backend::PasteBackend;
use crate::error::{StorageError, StorageResult};
use crate::tables::PASTES;
use crate::types::PasteRecord;

/// Convert any `Display` error into a `StorageError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StorageError::$variant(e.to_string())
    };
}

fn decode(bytes: &[u8]) -> StorageResult<PasteRecord> {
    serde_json::from_slice(bytes).map_err(map_err!(Deserialize))
}

fn encode(record: &PasteRecord) -> StorageResult<Vec<u8>> {
    serde_json::to_vec(record).map_err(map_err!(Serialize))
}

/// Thread-safe paste backend on top of a redb database.
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open (or create) a persistent database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let backend = Self { db: Arc::new(db) };
        backend.ensure_tables()?;
        debug!(?path, "paste database opened");
        Ok(backend)
    }

    /// Create an ephemeral in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let backend = Self { db: Arc::new(db) };
        backend.ensure_tables()?;
        debug!("in-memory paste database opened");
        Ok(backend)
    }

    fn ensure_tables(&self) -> StorageResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(PASTES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }
}

impl PasteBackend for RedbBackend {
    fn insert_new(&self, record: &PasteRecord) -> StorageResult<()> {
        let value = encode(record)?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(PASTES).map_err(map_err!(Table))?;
            let taken = table
                .get(record.slug.as_str())
                .map_err(map_err!(Read))?
                .is_some();
            if taken {
                drop(table);
                txn.abort().map_err(map_err!(Transaction))?;
                return Err(StorageError::Conflict(record.slug.clone()));
            }
            table
                .insert(record.slug.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(slug = %record.slug, "paste stored");
        Ok(())
    }

    fn fetch(&self, slug: &str) -> StorageResult<Option<PasteRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(PASTES).map_err(map_err!(Table))?;
        match table.get(slug).map_err(map_err!(Read))? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    fn record_view(&self, slug: &str) -> StorageResult<Option<PasteRecord>> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let record = {
            let mut table = txn.open_table(PASTES).map_err(map_err!(Table))?;
            let mut record = match table.get(slug).map_err(map_err!(Read))? {
                Some(guard) => decode(guard.value())?,
                None => return Ok(None),
            };
            record.views = record.views.saturating_add(1);
            let value = encode(&record)?;
            table
                .insert(slug, value.as_slice())
                .map_err(map_err!(Write))?;
            record
        };
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(Some(record))
    }

    fn remove_if_hash(&self, slug: &str, secret_hash: &str) -> StorageResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let removed = {
            let mut table = txn.open_table(PASTES).map_err(map_err!(Table))?;
            let matches = match table.get(slug).map_err(map_err!(Read))? {
                Some(guard) => decode(guard.value())?.secret_hash == secret_hash,
                None => false,
            };
            if matches {
                table.remove(slug).map_err(map_err!(Write))?;
            }
            matches
        };
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%slug, removed, "paste removal");
        Ok(removed)
    }

    fn count(&self) -> StorageResult<u64> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(PASTES).map_err(map_err!(Table))?;
        table.len().map_err(map_err!(Read))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_record(slug: &str) -> PasteRecord {
        PasteRecord::new(
            slug.to_string(),
            format!("content of {slug}"),
            format!("digest-{slug}"),
            Utc::now(),
        )
    }

    #[test]
    fn insert_and_fetch() {
        let backend = RedbBackend::open_in_memory().unwrap();
        let record = test_record("aaaaaaaa");

        backend.insert_new(&record).unwrap();

        assert_eq!(backend.fetch("aaaaaaaa").unwrap(), Some(record));
        assert_eq!(backend.count().unwrap(), 1);
    }

    #[test]
    fn insert_conflict_keeps_original() {
        let backend = RedbBackend::open_in_memory().unwrap();
        let original = test_record("aaaaaaaa");
        backend.insert_new(&original).unwrap();

        let mut imposter = test_record("aaaaaaaa");
        imposter.content = "other".to_string();
        let err = backend.insert_new(&imposter).unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(backend.fetch("aaaaaaaa").unwrap(), Some(original));
        assert_eq!(backend.count().unwrap(), 1);
    }

    #[test]
    fn record_view_increments() {
        let backend = RedbBackend::open_in_memory().unwrap();
        backend.insert_new(&test_record("aaaaaaaa")).unwrap();

        assert_eq!(backend.record_view("aaaaaaaa").unwrap().unwrap().views, 1);
        assert_eq!(backend.record_view("aaaaaaaa").unwrap().unwrap().views, 2);
        assert_eq!(backend.fetch("aaaaaaaa").unwrap().unwrap().views, 2);
    }

    #[test]
    fn record_view_unknown_slug() {
        let backend = RedbBackend::open_in_memory().unwrap();
        assert!(backend.record_view("missing0").unwrap().is_none());
        assert_eq!(backend.count().unwrap(), 0);
    }

    #[test]
    fn remove_requires_matching_digest() {
        let backend = RedbBackend::open_in_memory().unwrap();
        backend.insert_new(&test_record("aaaaaaaa")).unwrap();

        assert!(!backend.remove_if_hash("aaaaaaaa", "digest-other").unwrap());
        assert!(backend.fetch("aaaaaaaa").unwrap().is_some());

        assert!(backend.remove_if_hash("aaaaaaaa", "digest-aaaaaaaa").unwrap());
        assert!(backend.fetch("aaaaaaaa").unwrap().is_none());
        assert!(!backend.remove_if_hash("aaaaaaaa", "digest-aaaaaaaa").unwrap());
    }

    #[test]
    fn concurrent_views_are_not_lost() {
        let backend = RedbBackend::open_in_memory().unwrap();
        backend.insert_new(&test_record("aaaaaaaa")).unwrap();

        std::thread::scope(|s| {
            for _ in 0..16 {
                let backend = backend.clone();
                s.spawn(move || {
                    for _ in 0..10 {
                        backend.record_view("aaaaaaaa").unwrap();
                    }
                });
            }
        });

        assert_eq!(backend.fetch("aaaaaaaa").unwrap().unwrap().views, 160);
    }

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let backend = RedbBackend::open(&db_path).unwrap();
            backend.insert_new(&test_record("aaaaaaaa")).unwrap();
            backend.record_view("aaaaaaaa").unwrap();
        }

        let backend = RedbBackend::open(&db_path).unwrap();
        let record = backend.fetch("aaaaaaaa").unwrap().unwrap();
        assert_eq!(record.content, "content of aaaaaaaa");
        assert_eq!(record.views, 1);
    }
}
