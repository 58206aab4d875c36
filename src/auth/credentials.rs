//! Credential Hashing
//!
//! Salted digests with a boolean verification contract. The stored format is
//! `<salt-hex>$<digest-hex>`; malformed stored values verify as false rather
//! than erroring.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);

    format!(
        "{}${}",
        hex::encode(salt),
        hex::encode(digest(&salt, password))
    )
}

/// Verify a presented password against a stored hash.
pub fn verify_password(stored: &str, presented: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };

    constant_time_eq(&expected, &digest(&salt, presented))
}

fn digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_roundtrip() {
        let stored = hash_password("hunter2");

        assert!(verify_password(&stored, "hunter2"));
        assert!(!verify_password(&stored, "hunter3"));
    }

    #[test]
    fn test_salts_differ_between_hashes() {
        let a = hash_password("same-password");
        let b = hash_password("same-password");

        assert_ne!(a, b);
        assert!(verify_password(&a, "same-password"));
        assert!(verify_password(&b, "same-password"));
    }

    #[test]
    fn test_malformed_stored_value_is_rejected() {
        assert!(!verify_password("not-a-valid-hash", "anything"));
        assert!(!verify_password("zz$zz", "anything"));
        assert!(!verify_password("", "anything"));
    }
}
