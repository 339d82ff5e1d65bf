//! PBKDF2 key derivation for master password processing.
//!
//! Uses PBKDF2-HMAC-SHA256 with:
//! - Iterations: 100,000
//! - Output length: 32 bytes (256 bits)
//! - Salt length: 16 bytes
//!
//! Derivation is deliberately slow and cannot be interrupted once started.

use crate::crypto::keyring::MasterKey;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroizing;

/// Number of PBKDF2 rounds
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes
pub const KEY_LEN: usize = 32;

/// Generate a fresh random salt from the OS CSPRNG
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a master key from a password and salt
///
/// Same password and salt always produce the same key; this is what lets a
/// vault be reopened from its persisted salt.
pub fn derive_master_key(password: &[u8], salt: &[u8; SALT_LEN]) -> MasterKey {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut *key);
    MasterKey::from_bytes(*key)
}

/// Derive a key, generating a salt when none is supplied
///
/// # Returns
/// The derived key together with the salt that was used
pub fn derive_key(
    master_password: &str,
    salt: Option<[u8; SALT_LEN]>,
) -> (MasterKey, [u8; SALT_LEN]) {
    let salt = salt.unwrap_or_else(generate_salt);
    let key = derive_master_key(master_password.as_bytes(), &salt);
    (key, salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let salt = generate_salt();

        let key1 = derive_master_key(b"test_password_123!", &salt);
        let key2 = derive_master_key(b"test_password_123!", &salt);
        assert_eq!(key1.as_bytes(), key2.as_bytes());

        // Different password should produce different key
        let key3 = derive_master_key(b"different_password", &salt);
        assert_ne!(key1.as_bytes(), key3.as_bytes());
    }

    #[test]
    fn test_different_salt_changes_key() {
        let (key1, salt1) = derive_key("same password", None);
        let (key2, salt2) = derive_key("same password", None);

        assert_ne!(salt1, salt2);
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_supplied_salt_is_returned() {
        let salt = [7u8; SALT_LEN];
        let (key, used) = derive_key("longenoughpw", Some(salt));
        assert_eq!(used, salt);

        let again = derive_master_key(b"longenoughpw", &salt);
        assert_eq!(key.as_bytes(), again.as_bytes());
    }

    #[test]
    fn test_uses_fixed_iteration_count() {
        let mut expected = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(
            b"password",
            b"saltsaltsaltsalt",
            PBKDF2_ITERATIONS,
            &mut expected,
        );

        let key = derive_master_key(b"password", b"saltsaltsaltsalt");
        assert_eq!(key.as_bytes(), &expected);
    }
}
