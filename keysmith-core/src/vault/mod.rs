//! Vault session - coordinates crypto and storage layers
//!
//! A [`VaultSession`] starts locked. `create` or a successful `unlock`
//! loads the derived key; `lock` (or dropping the session) wipes it. Every
//! record operation is a full read-decrypt-modify-encrypt-write cycle over
//! the vault file.

pub mod record;
pub mod shared;
pub mod store;

pub use record::{RecordUpdate, VaultRecord};
pub use store::{VaultContents, VaultFile, VaultStore};

use crate::{
    crypto::{derive_key, derive_master_key, KeyRing, MasterKey, SALT_LEN},
    platform::resolve_vault_path,
    KeysmithError, Result,
};
use std::path::Path;
use tracing::{info, warn};

/// Minimum master password length, in characters
pub const MIN_MASTER_PASSWORD_LEN: usize = 8;

/// Locked/unlocked session over a single vault file
#[derive(Debug)]
pub struct VaultSession {
    store: VaultStore,
    key_ring: KeyRing,
    salt: Option<[u8; SALT_LEN]>,
}

impl VaultSession {
    /// Create a locked session for the vault at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            store: VaultStore::new(path),
            key_ring: KeyRing::new(),
            salt: None,
        }
    }

    /// Create a locked session for the configured default vault
    pub fn open_default() -> Self {
        Self::new(resolve_vault_path(None))
    }

    /// Get the filesystem path for this vault
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Check whether a vault file exists
    pub fn exists(&self) -> bool {
        self.store.exists()
    }

    /// Check if the session holds a key
    pub fn is_unlocked(&self) -> bool {
        self.key_ring.is_unlocked()
    }

    /// Create a new, empty vault, overwriting any existing file
    pub fn create(&mut self, master_password: &str) -> Result<()> {
        validate_master_password(master_password)?;

        let (key, salt) = derive_key(master_password, None);
        self.store.save(&key, &salt, &VaultContents::empty())?;

        self.install(key, salt);
        info!(path = %self.store.path().display(), "Vault created");
        Ok(())
    }

    /// Unlock an existing vault
    ///
    /// On any failure the session is left locked.
    pub fn unlock(&mut self, master_password: &str) -> Result<()> {
        self.lock();

        match self.try_unlock(master_password) {
            Ok((key, salt)) => {
                self.install(key, salt);
                info!(path = %self.store.path().display(), "Vault unlocked");
                Ok(())
            }
            Err(e) => {
                warn!(kind = ?e.kind(), "Vault unlock failed");
                Err(e)
            }
        }
    }

    fn try_unlock(&self, master_password: &str) -> Result<(MasterKey, [u8; SALT_LEN])> {
        let file = self.store.read()?;
        let key = derive_master_key(master_password.as_bytes(), &file.salt);
        // Decrypting the payload is the password check
        store::decrypt_contents(&file, &key)?;
        Ok((key, file.salt))
    }

    /// Lock the vault (clear the key from memory)
    pub fn lock(&mut self) {
        let was_unlocked = self.key_ring.is_unlocked();
        self.key_ring.clear();
        self.salt = None;
        if was_unlocked {
            info!("Vault locked");
        }
    }

    /// List all records in id order
    ///
    /// A locked session has nothing to show and returns an empty list
    /// without touching the file.
    pub fn list(&self) -> Result<Vec<VaultRecord>> {
        if !self.is_unlocked() {
            return Ok(Vec::new());
        }
        let mut records = self.load()?.records;
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    /// Get a single record
    pub fn get(&self, id: u64) -> Result<VaultRecord> {
        self.require_unlocked()?;
        self.load()?
            .records
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(KeysmithError::NotFound(id))
    }

    /// Add a record and return its id
    pub fn add(&self, service: &str, username: &str, password: &str, notes: &str) -> Result<u64> {
        self.require_unlocked()?;
        let mut contents = self.load()?;

        let id = contents.allocate_id()?;
        contents
            .records
            .push(VaultRecord::new(id, service, username, password, notes));
        self.save(&contents)?;

        info!(id, "Record added");
        Ok(id)
    }

    /// Update fields of an existing record
    pub fn update(&self, id: u64, fields: RecordUpdate) -> Result<VaultRecord> {
        self.require_unlocked()?;
        let mut contents = self.load()?;

        let record = contents
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(KeysmithError::NotFound(id))?;
        fields.apply(record);
        let updated = record.clone();
        self.save(&contents)?;

        info!(id, "Record updated");
        Ok(updated)
    }

    /// Delete a record; remaining ids are left unchanged
    pub fn delete(&self, id: u64) -> Result<()> {
        self.require_unlocked()?;
        let mut contents = self.load()?;

        let before = contents.records.len();
        contents.records.retain(|r| r.id != id);
        if contents.records.len() == before {
            return Err(KeysmithError::NotFound(id));
        }
        self.save(&contents)?;

        info!(id, "Record deleted");
        Ok(())
    }

    /// Re-encrypt the vault under a new master password and a fresh salt
    pub fn change_master_password(&mut self, new_password: &str) -> Result<()> {
        self.require_unlocked()?;
        validate_master_password(new_password)?;

        let contents = self.load()?;
        let (key, salt) = derive_key(new_password, None);
        self.store.save(&key, &salt, &contents)?;

        self.install(key, salt);
        info!("Master password changed");
        Ok(())
    }

    fn install(&mut self, key: MasterKey, salt: [u8; SALT_LEN]) {
        self.key_ring.install(key);
        self.salt = Some(salt);
    }

    fn require_unlocked(&self) -> Result<()> {
        if self.is_unlocked() {
            Ok(())
        } else {
            Err(KeysmithError::VaultLocked)
        }
    }

    fn load(&self) -> Result<VaultContents> {
        let key = self.key_ring.key()?;
        let (_, contents) = self.store.load(key)?;
        Ok(contents)
    }

    fn save(&self, contents: &VaultContents) -> Result<()> {
        let key = self.key_ring.key()?;
        let salt = self.salt.as_ref().ok_or(KeysmithError::VaultLocked)?;
        self.store.save(key, salt, contents)
    }
}

fn validate_master_password(master_password: &str) -> Result<()> {
    if master_password.chars().count() < MIN_MASTER_PASSWORD_LEN {
        return Err(KeysmithError::Validation(format!(
            "Master password must be at least {} characters",
            MIN_MASTER_PASSWORD_LEN
        )));
    }
    Ok(())
}
