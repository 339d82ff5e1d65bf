//! Session key ownership.
//!
//! The master key lives only inside a [`KeyRing`] owned by the vault
//! session. Dropping or clearing the ring zeroizes the key bytes.

use crate::crypto::{CryptoError, Result};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The key derived from the master password
///
/// Never persisted; it is re-derived from the master password and the
/// vault salt on every unlock.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; 32],
}

impl MasterKey {
    /// Create a master key from raw bytes
    pub fn from_bytes(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Get a reference to the key bytes (use sparingly)
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// Holder for the key of an unlocked vault
#[derive(Debug, Default)]
pub struct KeyRing {
    master_key: Option<MasterKey>,
}

impl KeyRing {
    /// Create an empty (locked) key ring
    pub fn new() -> Self {
        Self { master_key: None }
    }

    /// Take ownership of a freshly derived key, replacing any previous one
    pub fn install(&mut self, key: MasterKey) {
        // The old key, if any, is zeroized when it is dropped here.
        self.master_key = Some(key);
    }

    /// Clear the key from memory
    pub fn clear(&mut self) {
        if let Some(mut key) = self.master_key.take() {
            key.zeroize();
        }
    }

    /// Check whether a key is held
    pub fn is_unlocked(&self) -> bool {
        self.master_key.is_some()
    }

    /// Get the key (only available when unlocked)
    pub fn key(&self) -> Result<&MasterKey> {
        self.master_key
            .as_ref()
            .ok_or(CryptoError::KeyNotLoaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_and_clear() {
        let mut ring = KeyRing::new();
        assert!(!ring.is_unlocked());
        assert!(matches!(ring.key(), Err(CryptoError::KeyNotLoaded)));

        ring.install(MasterKey::from_bytes([42u8; 32]));
        assert!(ring.is_unlocked());
        assert_eq!(ring.key().unwrap().as_bytes(), &[42u8; 32]);

        ring.clear();
        assert!(!ring.is_unlocked());
        assert!(matches!(ring.key(), Err(CryptoError::KeyNotLoaded)));
    }

    #[test]
    fn test_zeroize_wipes_bytes() {
        let mut key = MasterKey::from_bytes([0xAB; 32]);
        key.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let key = MasterKey::from_bytes([0x41; 32]);
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains("65"));
        assert!(rendered.contains("REDACTED"));
    }
}
