//! PasteStore: create, retrieve and delete pastes.
//!
//! All cross-cutting invariants live here: input limits, bounded slug
//! allocation, view accounting through the backend's atomic increment, and
//! secret-guarded deletion. Persistence goes through [`PasteBackend`];
//! nothing in this module holds a lock.

use std::sync::Arc;

use chrono::Utc;
use pastebox_core::{DEFAULT_MAX_SLUG_ATTEMPTS, MAX_CONTENT_BYTES, PasteboxConfig};
use tracing::{debug, warn};

use crate::backend::PasteBackend;
use crate::credential::{Argon2Guard, CredentialGuard, check_secret};
use crate::error::{PasteError, PasteResult};
use crate::slug::{RandomSlugGenerator, SlugGenerator, is_well_formed};
use crate::types::{CreatedPaste, PasteRecord, PasteView};

/// Shareable handle to the paste store.
#[derive(Clone)]
pub struct PasteStore {
    backend: Arc<dyn PasteBackend>,
    slugs: Arc<dyn SlugGenerator>,
    guard: Arc<dyn CredentialGuard>,
    max_slug_attempts: u32,
}

impl PasteStore {
    pub fn new(
        backend: Arc<dyn PasteBackend>,
        slugs: Arc<dyn SlugGenerator>,
        guard: Arc<dyn CredentialGuard>,
    ) -> Self {
        Self {
            backend,
            slugs,
            guard,
            max_slug_attempts: DEFAULT_MAX_SLUG_ATTEMPTS,
        }
    }

    /// Random slugs and an Argon2id guard tuned by `config`.
    pub fn from_config(backend: Arc<dyn PasteBackend>, config: &PasteboxConfig) -> PasteResult<Self> {
        let guard = Argon2Guard::new(&config.credential)?;
        Ok(Self::new(backend, Arc::new(RandomSlugGenerator::new()), Arc::new(guard))
            .with_max_slug_attempts(config.store.max_slug_attempts))
    }

    /// Bound on slug candidates per create. Zero is treated as one.
    pub fn with_max_slug_attempts(mut self, attempts: u32) -> Self {
        self.max_slug_attempts = attempts.max(1);
        self
    }

    pub fn max_slug_attempts(&self) -> u32 {
        self.max_slug_attempts
    }

    /// Store `content` under a fresh slug, guarded by `secret`.
    pub fn create(&self, content: &str, secret: &str) -> PasteResult<CreatedPaste> {
        if content.is_empty() {
            return Err(PasteError::validation("Content is required"));
        }
        if secret.is_empty() {
            return Err(PasteError::validation("Delete password is required"));
        }
        if content.len() > MAX_CONTENT_BYTES {
            return Err(PasteError::validation("Content is too large (max 500KB)"));
        }
        check_secret(secret)?;

        let secret_hash = self.guard.hash(secret)?;
        let created_at = Utc::now();
        let mut record =
            PasteRecord::new(String::new(), content.to_string(), secret_hash, created_at);

        for attempt in 1..=self.max_slug_attempts {
            record.slug = self.slugs.generate();
            match self.backend.insert_new(&record) {
                Ok(()) => {
                    debug!(slug = %record.slug, attempt, bytes = content.len(), "paste created");
                    return Ok(CreatedPaste {
                        slug: record.slug,
                        created_at,
                    });
                }
                Err(e) if e.is_conflict() => {
                    warn!(slug = %record.slug, attempt, "slug collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(attempts = self.max_slug_attempts, "slug allocation exhausted");
        Err(PasteError::CollisionExhausted {
            attempts: self.max_slug_attempts,
        })
    }

    /// Fetch a paste and count the view.
    pub fn get(&self, slug: &str) -> PasteResult<PasteView> {
        if !is_well_formed(slug) {
            return Err(PasteError::NotFound);
        }
        match self.backend.record_view(slug)? {
            Some(record) => {
                debug!(%slug, views = record.views, "paste viewed");
                Ok(record.view())
            }
            None => Err(PasteError::NotFound),
        }
    }

    /// Permanently remove a paste if `secret` matches the one it was created with.
    pub fn delete(&self, slug: &str, secret: &str) -> PasteResult<()> {
        if secret.is_empty() {
            return Err(PasteError::validation("Password is required"));
        }
        if !is_well_formed(slug) {
            return Err(PasteError::NotFound);
        }

        let record = self.backend.fetch(slug)?.ok_or(PasteError::NotFound)?;
        if !self.guard.verify(secret, &record.secret_hash)? {
            debug!(%slug, "delete refused, secret mismatch");
            return Err(PasteError::Forbidden);
        }

        // Compare-and-delete: a concurrent delete that won the race leaves
        // nothing to remove.
        if self.backend.remove_if_hash(slug, &record.secret_hash)? {
            debug!(%slug, "paste deleted");
            Ok(())
        } else {
            Err(PasteError::NotFound)
        }
    }

    /// Number of live pastes.
    pub fn count(&self) -> PasteResult<u64> {
        Ok(self.backend.count()?)
    }
}
