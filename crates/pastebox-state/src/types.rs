//! Domain types for the paste store.
//!
//! [`PasteRecord`] is the persisted shape and is the only type that carries
//! the secret digest. [`CreatedPaste`] and [`PasteView`] are what callers get
//! back; neither has a digest field.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored paste.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct PasteRecord {
    pub slug: String,
    pub content: String,
    /// PHC-format digest of the deletion secret.
    pub secret_hash: String,
    pub created_at: DateTime<Utc>,
    pub views: u64,
}

impl PasteRecord {
    /// A fresh record with zero views.
    pub fn new(slug: String, content: String, secret_hash: String, created_at: DateTime<Utc>) -> Self {
        Self {
            slug,
            content,
            secret_hash,
            created_at,
            views: 0,
        }
    }

    pub fn view(&self) -> PasteView {
        PasteView {
            slug: self.slug.clone(),
            content: self.content.clone(),
            created_at: self.created_at,
            views: self.views,
        }
    }
}

impl fmt::Debug for PasteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasteRecord")
            .field("slug", &self.slug)
            .field("content_len", &self.content.len())
            .field("secret_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("views", &self.views)
            .finish()
    }
}

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPaste {
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful retrieval; `views` already includes that retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteView {
    pub slug: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub views: u64,
}
