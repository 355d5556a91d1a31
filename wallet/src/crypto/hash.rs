//! # Hashing Utilities
//!
//! TokenD hashes exactly two things with SHA-256: the network passphrase
//! (giving the network id) and the transaction signature base (giving the
//! transaction hash, which is what actually gets signed). There is no
//! second hash function to choose from, which is a refreshing change.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data as a fixed-size array.
///
/// # Example
///
/// ```
/// use tokend_wallet::crypto::sha256;
///
/// let hash = sha256(b"Example Test Network");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash several byte slices as if they were concatenated, without
/// allocating the concatenation.
pub fn sha256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        // SHA-256 of the empty string, the canonical test vector everyone should
        // have memorized by now.
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);
    }

    #[test]
    fn network_passphrase_vector() {
        assert_eq!(
            hex::encode(sha256(b"Example Test Network")),
            "bfe561451476e0f855c3aa42124bb403ef0f7735e911d50f6283486d2bacee3a"
        );
    }

    #[test]
    fn concat_matches_single_pass() {
        let joined = sha256(b"network-idenvelopebody");
        let parts = sha256_concat(&[b"network-id", b"envelope", b"body"]);
        assert_eq!(joined, parts);
    }
}
