//! Fixed limits shared by the store and the HTTP layer.

/// Largest accepted paste body, in UTF-8 bytes.
pub const MAX_CONTENT_BYTES: usize = 500_000;

/// Shortest accepted deletion secret, in characters.
pub const MIN_SECRET_CHARS: usize = 3;

/// Length of every public slug.
pub const SLUG_LEN: usize = 8;

/// Default bound on slug allocation attempts per create.
pub const DEFAULT_MAX_SLUG_ATTEMPTS: u32 = 5;
