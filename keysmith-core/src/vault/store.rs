//! On-disk vault file.
//!
//! The file is a small JSON document:
//!
//! ```json
//! { "salt": "<base64>", "passwords": "<base64 token>", "next_id": 4 }
//! ```
//!
//! `passwords` is an encrypted token over the JSON array of records. The
//! `next_id` counter is bound into the token's associated data, so editing
//! it makes decryption fail. Every write replaces the whole file through a
//! temporary file and a rename.

use crate::{
    crypto::{decrypt_token, encrypt_token, MasterKey, SALT_LEN},
    vault::record::VaultRecord,
    KeysmithError, Result,
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use zeroize::Zeroizing;

#[derive(Serialize, Deserialize)]
struct StoredVault {
    salt: String,
    passwords: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_id: Option<u64>,
}

/// Decoded vault file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultFile {
    pub salt: [u8; SALT_LEN],
    /// Encrypted token over the serialized record list
    pub token: Vec<u8>,
    /// Persisted id counter; absent in files written by older versions
    pub next_id: Option<u64>,
}

impl VaultFile {
    /// Parse the JSON file contents
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let stored: StoredVault = serde_json::from_slice(bytes)
            .map_err(|e| KeysmithError::Storage(format!("Malformed vault file: {}", e)))?;

        let salt = general_purpose::STANDARD
            .decode(&stored.salt)
            .map_err(|e| KeysmithError::Storage(format!("Invalid salt encoding: {}", e)))?;
        let salt: [u8; SALT_LEN] = salt.try_into().map_err(|s: Vec<u8>| {
            KeysmithError::Storage(format!("Invalid salt length: {}", s.len()))
        })?;

        let token = general_purpose::STANDARD
            .decode(&stored.passwords)
            .map_err(|e| KeysmithError::Storage(format!("Invalid payload encoding: {}", e)))?;

        Ok(Self {
            salt,
            token,
            next_id: stored.next_id,
        })
    }

    /// Serialize to the JSON file contents
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let stored = StoredVault {
            salt: general_purpose::STANDARD.encode(self.salt),
            passwords: general_purpose::STANDARD.encode(&self.token),
            next_id: self.next_id,
        };
        Ok(serde_json::to_vec(&stored)?)
    }
}

/// Decrypted vault contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultContents {
    pub records: Vec<VaultRecord>,
    /// Next id to hand out; always greater than every stored id
    pub next_id: u64,
}

impl VaultContents {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Reserve the next id
    pub fn allocate_id(&mut self) -> Result<u64> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or_else(counter_exhausted)?;
        Ok(id)
    }
}

fn counter_exhausted() -> KeysmithError {
    KeysmithError::Storage("id counter exhausted".to_string())
}

/// Associated data that ties the token to the stored counter
fn counter_context(next_id: Option<u64>) -> Vec<u8> {
    next_id.map(|n| n.to_be_bytes().to_vec()).unwrap_or_default()
}

/// Whole-file reads and writes of the vault
#[derive(Debug, Clone)]
pub struct VaultStore {
    path: PathBuf,
}

impl VaultStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and parse the vault file without decrypting it
    pub fn read(&self) -> Result<VaultFile> {
        let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                KeysmithError::Storage(format!("No vault found at {}", self.path.display()))
            }
            _ => KeysmithError::Io(e),
        })?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "read vault file");
        VaultFile::from_json(&bytes)
    }

    /// Atomically replace the vault file
    pub fn write(&self, file: &VaultFile) -> Result<()> {
        let bytes = file.to_json()?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| KeysmithError::Io(e.error))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "wrote vault file");
        Ok(())
    }

    /// Read the file and decrypt its records with `key`
    ///
    /// Returns the salt stored in the file along with the contents.
    pub fn load(&self, key: &MasterKey) -> Result<([u8; SALT_LEN], VaultContents)> {
        let file = self.read()?;
        let contents = decrypt_contents(&file, key)?;
        Ok((file.salt, contents))
    }

    /// Encrypt `contents` under `key` and replace the file
    pub fn save(
        &self,
        key: &MasterKey,
        salt: &[u8; SALT_LEN],
        contents: &VaultContents,
    ) -> Result<()> {
        let next_id = Some(contents.next_id);
        let plaintext = Zeroizing::new(serde_json::to_vec(&contents.records)?);
        let token = encrypt_token(key, &plaintext, &counter_context(next_id))?;
        self.write(&VaultFile {
            salt: *salt,
            token,
            next_id,
        })
    }
}

/// Decrypt a parsed vault file
pub fn decrypt_contents(file: &VaultFile, key: &MasterKey) -> Result<VaultContents> {
    let context = counter_context(file.next_id);
    let plaintext = Zeroizing::new(decrypt_token(key, &file.token, &context)?);
    let records: Vec<VaultRecord> = serde_json::from_slice(&plaintext)
        .map_err(|e| KeysmithError::Storage(format!("Malformed vault payload: {}", e)))?;

    let after_max = records
        .iter()
        .map(|r| r.id)
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(counter_exhausted)?;
    let next_id = file.next_id.unwrap_or(after_max).max(after_max);

    Ok(VaultContents { records, next_id })
}
