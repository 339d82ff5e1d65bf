//! Async handle around a [`VaultSession`]
//!
//! Key derivation takes a noticeable amount of CPU time, so every session
//! call runs on tokio's blocking pool. Calls are serialized through a mutex.
//! Dropping a returned future does not stop work already handed to the pool:
//! an in-flight derivation always runs to completion.

use crate::{
    vault::{RecordUpdate, VaultRecord, VaultSession},
    KeysmithError, Result,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use zeroize::Zeroizing;

/// Cloneable, thread-safe vault handle for async front ends
#[derive(Clone)]
pub struct SharedVault {
    session: Arc<Mutex<VaultSession>>,
}

impl SharedVault {
    pub fn new(session: VaultSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    pub async fn path(&self) -> PathBuf {
        self.session.lock().await.path().to_path_buf()
    }

    pub async fn is_unlocked(&self) -> bool {
        self.session.lock().await.is_unlocked()
    }

    pub async fn create(&self, master_password: impl Into<String>) -> Result<()> {
        let master_password = Zeroizing::new(master_password.into());
        self.run(move |session| session.create(&master_password)).await
    }

    pub async fn unlock(&self, master_password: impl Into<String>) -> Result<()> {
        let master_password = Zeroizing::new(master_password.into());
        self.run(move |session| session.unlock(&master_password)).await
    }

    pub async fn lock(&self) {
        self.session.lock().await.lock();
    }

    pub async fn list(&self) -> Result<Vec<VaultRecord>> {
        self.run(|session| session.list()).await
    }

    pub async fn add(
        &self,
        service: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        notes: impl Into<String>,
    ) -> Result<u64> {
        let (service, username, notes) = (service.into(), username.into(), notes.into());
        let password = Zeroizing::new(password.into());
        self.run(move |session| session.add(&service, &username, &password, &notes))
            .await
    }

    pub async fn update(&self, id: u64, fields: RecordUpdate) -> Result<VaultRecord> {
        self.run(move |session| session.update(id, fields)).await
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.run(move |session| session.delete(id)).await
    }

    pub async fn change_master_password(&self, new_password: impl Into<String>) -> Result<()> {
        let new_password = Zeroizing::new(new_password.into());
        self.run(move |session| session.change_master_password(&new_password))
            .await
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut VaultSession) -> Result<T> + Send + 'static,
    {
        let session = Arc::clone(&self.session);
        tokio::task::spawn_blocking(move || {
            let mut guard = session.blocking_lock();
            op(&mut *guard)
        })
        .await
        .map_err(|e| KeysmithError::Storage(format!("Vault task failed: {}", e)))?
    }
}
