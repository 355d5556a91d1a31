//! Where default salts come from.
//!
//! The salt exists only to make otherwise identical transactions hash
//! differently. Production code draws it from the OS RNG; tests inject a
//! fixed value so envelopes are reproducible.

use rand::rngs::OsRng;
use rand::RngCore;

/// Source of default transaction salts.
pub trait SaltSource: Send + Sync {
    /// A non-negative salt.
    fn next_salt(&self) -> i64;
}

/// 63 random bits from the OS RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSaltSource;

impl SaltSource for OsSaltSource {
    fn next_salt(&self) -> i64 {
        // The shift clears the sign bit, so the cast can't go negative.
        (OsRng.next_u64() >> 1) as i64
    }
}

/// Always returns the same salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSalt(pub i64);

impl SaltSource for FixedSalt {
    fn next_salt(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_salts_are_non_negative_and_vary() {
        let salts: Vec<i64> = (0..32).map(|_| OsSaltSource.next_salt()).collect();
        assert!(salts.iter().all(|s| *s >= 0));
        assert!(salts.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn fixed_salt_is_fixed() {
        assert_eq!(FixedSalt(42).next_salt(), 42);
        assert_eq!(FixedSalt(42).next_salt(), 42);
    }
}
