use std::sync::Mutex;

use super::{CredentialStore, StoredCredentials};
use crate::error::CredentialError;
use crate::models::User;

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<StoredCredentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing credentials, e.g. in tests
    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            inner: Mutex::new(credentials),
        }
    }

    fn update(&self, f: impl FnOnce(&mut StoredCredentials)) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn read(&self) -> StoredCredentials {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn write_tokens(&self, access: &str, refresh: &str) -> Result<(), CredentialError> {
        self.update(|creds| {
            creds.access_token = Some(access.to_string());
            creds.refresh_token = Some(refresh.to_string());
        });
        Ok(())
    }

    fn write_access_token(&self, access: &str) -> Result<(), CredentialError> {
        self.update(|creds| creds.access_token = Some(access.to_string()));
        Ok(())
    }

    fn write_identity(&self, user: &User) -> Result<(), CredentialError> {
        self.update(|creds| creds.user = Some(user.clone()));
        Ok(())
    }

    fn clear_all(&self) -> Result<(), CredentialError> {
        self.update(|creds| *creds = StoredCredentials::default());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::contract;

    #[test]
    fn test_empty_store() {
        contract::empty_store_reads_absent(&MemoryCredentialStore::new());
    }

    #[test]
    fn test_write_access_token_isolation() {
        contract::write_access_token_is_isolated(&MemoryCredentialStore::new());
    }

    #[test]
    fn test_write_tokens_keeps_identity() {
        contract::write_tokens_keeps_identity(&MemoryCredentialStore::new());
    }

    #[test]
    fn test_clear_all() {
        contract::clear_all_is_idempotent(&MemoryCredentialStore::new());
    }
}
