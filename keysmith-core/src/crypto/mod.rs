//! Cryptographic primitives and password tooling.
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 key derivation
//! - AES-256-GCM versioned tokens
//! - Session key ownership with zeroization
//! - Password generation and strength scoring

pub mod cipher;
pub mod kdf;
pub mod keyring;
pub mod password;
pub mod strength;

pub use cipher::{decrypt_token, encrypt_token, TOKEN_VERSION};
pub use kdf::{derive_key, derive_master_key, generate_salt, SALT_LEN};
pub use keyring::{KeyRing, MasterKey};

use thiserror::Error;

/// Errors that can occur in cryptographic operations
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("No key loaded")]
    KeyNotLoaded,

    #[error("Authentication failed - wrong key or tampered data")]
    AuthenticationFailed,

    #[error("Unsupported token version: {0}")]
    UnsupportedVersion(u8),

    #[error("Malformed token")]
    MalformedToken,

    #[error("Invalid character policy: {0}")]
    InvalidPolicy(String),
}

/// Result type for crypto operations
pub type Result<T> = std::result::Result<T, CryptoError>;
