//! AES-256-GCM tokens for the vault payload.
//!
//! Token layout:
//! - 1 byte format version
//! - 12 byte random nonce
//! - ciphertext followed by the 16 byte authentication tag
//!
//! The associated data is the version byte followed by a caller-supplied
//! context. The context is not stored in the token, so the same bytes must
//! be passed back to [`decrypt_token`]. A fresh nonce is drawn for every
//! encryption.

use crate::crypto::{keyring::MasterKey, CryptoError, Result};
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    Aes256Gcm, Nonce,
};

/// Current token format version
pub const TOKEN_VERSION: u8 = 1;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + NONCE_LEN;

fn associated_data(version: u8, context: &[u8]) -> Vec<u8> {
    let mut aad = Vec::with_capacity(1 + context.len());
    aad.push(version);
    aad.extend_from_slice(context);
    aad
}

/// Encrypt a payload into a versioned token bound to `context`
pub fn encrypt_token(key: &MasterKey, plaintext: &[u8], context: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let aad = associated_data(TOKEN_VERSION, context);

    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad: &aad,
            },
        )
        .map_err(|e| CryptoError::EncryptionFailed(format!("{}", e)))?;

    let mut token = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    token.push(TOKEN_VERSION);
    token.extend_from_slice(&nonce);
    token.extend_from_slice(&ciphertext);
    Ok(token)
}

/// Decrypt and verify a token
///
/// # Security
/// - A wrong key, a modified token and a mismatched `context` all fail with
///   `AuthenticationFailed`; the cases cannot be told apart
pub fn decrypt_token(key: &MasterKey, token: &[u8], context: &[u8]) -> Result<Vec<u8>> {
    if token.len() < HEADER_LEN + TAG_LEN {
        return Err(CryptoError::MalformedToken);
    }

    let version = token[0];
    if version != TOKEN_VERSION {
        return Err(CryptoError::UnsupportedVersion(version));
    }

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(&token[1..HEADER_LEN]);
    let aad = associated_data(version, context);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: &token[HEADER_LEN..],
                aad: &aad,
            },
        )
        .map_err(|_| CryptoError::AuthenticationFailed)
}
