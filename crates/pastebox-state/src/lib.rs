//! pastebox-state: the paste store behind pastebox.
//!
//! Owns the three correctness-sensitive pieces of the service:
//!
//! - [`slug`]: random 8-character public identifiers,
//! - [`credential`]: Argon2id hashing and verification of deletion secrets,
//! - [`store`]: [`PasteStore`], which allocates slugs under a storage-level
//!   uniqueness constraint, counts views atomically, and guards deletion.
//!
//! # Architecture
//!
//! `PasteStore` never touches a database directly. It talks to a
//! [`PasteBackend`], which must provide insert-if-absent, atomic
//! read-and-increment and compare-and-delete. [`RedbBackend`] is the durable
//! implementation; [`MemoryBackend`] keeps the same contracts for tests.
//!
//! The store is `Clone` + `Send` + `Sync` (every collaborator sits behind an
//! `Arc`) and can be shared across threads and async tasks.

pub mod backend;
pub mod credential;
pub mod error;
pub mod memory;
pub mod redb_backend;
pub mod slug;
pub mod store;
pub mod tables;
pub mod types;

pub use backend::PasteBackend;
pub use credential::{Argon2Guard, CredentialGuard};
pub use error::{PasteError, PasteResult, StorageError, StorageResult};
pub use memory::MemoryBackend;
pub use redb_backend::RedbBackend;
pub use slug::{RandomSlugGenerator, SlugGenerator};
pub use store::PasteStore;
pub use types::*;
