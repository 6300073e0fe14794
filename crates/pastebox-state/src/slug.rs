//! Public slug generation.
//!
//! Slugs are 8 characters from the 64-symbol URL-safe alphabet, giving 48 bits
//! of entropy per slug. Generators do not check uniqueness; the backend's
//! insert-if-absent does.

use pastebox_core::SLUG_LEN;
use rand::Rng;

/// URL-safe alphabet (`A-Z a-z 0-9 _ -`).
pub const SLUG_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Source of slug candidates.
pub trait SlugGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Draws each character uniformly from [`SLUG_ALPHABET`] using the
/// thread-local CSPRNG (ChaCha, reseeded from the OS).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSlugGenerator;

impl RandomSlugGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl SlugGenerator for RandomSlugGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..SLUG_LEN)
            .map(|_| SLUG_ALPHABET[rng.random_range(0..SLUG_ALPHABET.len())] as char)
            .collect()
    }
}

/// True if `slug` could have been produced by a generator.
pub fn is_well_formed(slug: &str) -> bool {
    slug.len() == SLUG_LEN && slug.bytes().all(|b| SLUG_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_fixed_length_from_alphabet() {
        let generator = RandomSlugGenerator::new();
        for _ in 0..1000 {
            let slug = generator.generate();
            assert_eq!(slug.len(), SLUG_LEN);
            assert!(is_well_formed(&slug), "unexpected slug {slug}");
        }
    }

    #[test]
    fn slugs_do_not_repeat_in_practice() {
        let generator = RandomSlugGenerator::new();
        let slugs: HashSet<String> = (0..10_000).map(|_| generator.generate()).collect();
        assert_eq!(slugs.len(), 10_000);
    }

    #[test]
    fn every_symbol_shows_up() {
        let generator = RandomSlugGenerator::new();
        let mut seen = HashSet::new();
        for _ in 0..2000 {
            seen.extend(generator.generate().into_bytes());
        }
        assert_eq!(seen.len(), SLUG_ALPHABET.len());
    }

    #[test]
    fn safe_to_share_across_threads() {
        let generator = RandomSlugGenerator::new();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        assert!(is_well_formed(&generator.generate()));
                    }
                });
            }
        });
    }

    #[test]
    fn rejects_malformed_slugs() {
        assert!(is_well_formed("x7ka9f2q"));
        assert!(is_well_formed("A_b-C0z9"));
        assert!(!is_well_formed("short"));
        assert!(!is_well_formed("waytoolong1"));
        assert!(!is_well_formed("bad/slug"));
        assert!(!is_well_formed("x7ka9f2é"));
        assert!(!is_well_formed(""));
    }
}
