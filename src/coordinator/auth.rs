//! PIN hashing and verification. A seat's PIN is the only credential in this
//! system; it is hashed at join time and never stored or logged in plain
//! text.

use sha2::{Digest, Sha256};

pub fn hash_pin(pin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pin.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_pin(pin: &str, expected_hash: &str) -> bool {
    hash_pin(pin) == expected_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_pin_verifies() {
        let hash = hash_pin("1234");
        assert!(verify_pin("1234", &hash));
    }

    #[test]
    fn wrong_pin_rejected() {
        let hash = hash_pin("1234");
        assert!(!verify_pin("0000", &hash));
    }
}
