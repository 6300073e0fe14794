//! redb table definitions for the paste store.
//!
//! Keys are slugs; values are JSON-serialized [`PasteRecord`](crate::PasteRecord)s.

use redb::TableDefinition;

/// Live pastes keyed by slug.
pub const PASTES: TableDefinition<&str, &[u8]> = TableDefinition::new("pastes");
