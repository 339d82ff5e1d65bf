//! Keysmith core library
//!
//! Password generation and strength scoring, plus an encrypted credential
//! vault guarded by a master password.

pub mod crypto;
pub mod platform;
pub mod vault;

pub use crypto::password::{
    generate_by_level, generate_password, generate_pin, generate_pronounceable, CharacterPolicy,
    StrengthLevel,
};
pub use crypto::strength::{
    score_password, Feedback, FeedbackKind, StrengthRating, StrengthReport, StrengthTag,
};
pub use crypto::{CryptoError, MasterKey};
pub use platform::{get_data_dir, get_default_vault_path, resolve_vault_path};
pub use vault::shared::SharedVault;
pub use vault::{RecordUpdate, VaultRecord, VaultSession};

use thiserror::Error;

/// Result type for keysmith operations
pub type Result<T> = std::result::Result<T, KeysmithError>;

/// Coarse classification of a [`KeysmithError`], for callers that only need
/// to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Storage,
    State,
    NotFound,
}

/// General error type for keysmith operations
#[derive(Error, Debug)]
pub enum KeysmithError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Wrong master password or corrupted vault")]
    Authentication,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Vault is locked")]
    VaultLocked,

    #[error("Record {0} not found")]
    NotFound(u64),
}

impl KeysmithError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KeysmithError::Validation(_) => ErrorKind::Validation,
            KeysmithError::Authentication => ErrorKind::Authentication,
            KeysmithError::Storage(_) | KeysmithError::Serialization(_) | KeysmithError::Io(_) => {
                ErrorKind::Storage
            }
            KeysmithError::VaultLocked => ErrorKind::State,
            KeysmithError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

impl From<CryptoError> for KeysmithError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::AuthenticationFailed
            | CryptoError::MalformedToken
            | CryptoError::UnsupportedVersion(_) => KeysmithError::Authentication,
            CryptoError::InvalidPolicy(msg) => KeysmithError::Validation(msg),
            CryptoError::KeyNotLoaded => KeysmithError::VaultLocked,
            CryptoError::EncryptionFailed(msg) => KeysmithError::Storage(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_errors_are_classified() {
        let auth: KeysmithError = CryptoError::AuthenticationFailed.into();
        assert_eq!(auth.kind(), ErrorKind::Authentication);

        let version: KeysmithError = CryptoError::UnsupportedVersion(9).into();
        assert_eq!(version.kind(), ErrorKind::Authentication);

        let policy: KeysmithError = CryptoError::InvalidPolicy("empty".to_string()).into();
        assert_eq!(policy.kind(), ErrorKind::Validation);

        let encrypt: KeysmithError = CryptoError::EncryptionFailed("boom".to_string()).into();
        assert_eq!(encrypt.kind(), ErrorKind::Storage);

        let locked: KeysmithError = CryptoError::KeyNotLoaded.into();
        assert!(matches!(locked, KeysmithError::VaultLocked));
        assert_eq!(locked.kind(), ErrorKind::State);
    }

    #[test]
    fn test_io_error_is_storage() {
        let err: KeysmithError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(KeysmithError::VaultLocked.kind(), ErrorKind::State);
    }
}
