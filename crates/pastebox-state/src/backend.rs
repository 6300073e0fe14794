//! Storage interface used by [`PasteStore`](crate::PasteStore).

use crate::error::StorageResult;
use crate::types::PasteRecord;

/// Raw persistence for paste records.
///
/// The store relies on three atomic primitives instead of doing
/// read-then-write itself; every implementation must provide them as single
/// indivisible operations so that concurrent callers cannot interleave.
pub trait PasteBackend: Send + Sync {
    /// Insert `record` if no live record has its slug.
    ///
    /// Returns `Err(StorageError::Conflict)` when the slug is taken; the
    /// existing record is left untouched.
    fn insert_new(&self, record: &PasteRecord) -> StorageResult<()>;

    /// Read a record without side effects.
    fn fetch(&self, slug: &str) -> StorageResult<Option<PasteRecord>>;

    /// Increment `views` by one and return the updated record, atomically.
    ///
    /// Returns `Ok(None)` if the slug is unknown.
    fn record_view(&self, slug: &str) -> StorageResult<Option<PasteRecord>>;

    /// Remove the record only if its stored digest equals `secret_hash`.
    ///
    /// Returns true if a record was removed.
    fn remove_if_hash(&self, slug: &str, secret_hash: &str) -> StorageResult<bool>;

    /// Number of live records.
    fn count(&self) -> StorageResult<u64>;
}
