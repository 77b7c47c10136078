/// Credential storage
///
/// Holds the access token, refresh token and cached user identity.
/// Two implementations:
/// - `FileCredentialStore`: JSON file on disk, survives restarts
/// - `MemoryCredentialStore`: process-local, for tests and throwaway sessions
///
/// Implementations never talk to the network.

mod file;
mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use serde::{Deserialize, Serialize};

use crate::error::CredentialError;
use crate::models::User;

/// Snapshot of everything the store holds. Missing fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl StoredCredentials {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

/// Persistent credential storage shared by the request pipeline, the refresh
/// coordinator and the auth session.
///
/// Each call is atomic with respect to other calls on the same store.
pub trait CredentialStore: Send + Sync {
    /// Never fails; unreadable state reads as absent.
    fn read(&self) -> StoredCredentials;

    /// Replace both tokens in a single write. Identity is left as is.
    fn write_tokens(&self, access: &str, refresh: &str) -> Result<(), CredentialError>;

    /// Replace only the access token.
    fn write_access_token(&self, access: &str) -> Result<(), CredentialError>;

    fn write_identity(&self, user: &User) -> Result<(), CredentialError>;

    /// Remove tokens and identity. Idempotent.
    fn clear_all(&self) -> Result<(), CredentialError>;

    fn access_token(&self) -> Option<String> {
        self.read().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token
    }

    fn identity(&self) -> Option<User> {
        self.read().user
    }
}

/// Shared contract checks run against every implementation
#[cfg(test)]
pub(crate) mod contract {
    use super::*;
    use crate::models::Role;

    pub fn sample_user() -> User {
        User {
            id: 42,
            username: "agronomo".to_string(),
            email: "agronomo@finca.example".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            full_name: "Ana Ruiz".to_string(),
            phone: None,
            role: Role::Manager,
            is_active: true,
            created_at: "2024-03-01T10:00:00Z".to_string(),
        }
    }

    pub fn empty_store_reads_absent(store: &dyn CredentialStore) {
        let creds = store.read();
        assert!(creds.is_empty());
        assert!(store.access_token().is_none());
    }

    pub fn write_access_token_is_isolated(store: &dyn CredentialStore) {
        store.write_tokens("tok1", "ref1").unwrap();
        store.write_identity(&sample_user()).unwrap();

        store.write_access_token("tok2").unwrap();

        let creds = store.read();
        assert_eq!(creds.access_token.as_deref(), Some("tok2"));
        assert_eq!(creds.refresh_token.as_deref(), Some("ref1"));
        assert_eq!(creds.user, Some(sample_user()));
    }

    pub fn write_tokens_keeps_identity(store: &dyn CredentialStore) {
        store.write_identity(&sample_user()).unwrap();
        store.write_tokens("a", "r").unwrap();

        let creds = store.read();
        assert_eq!(creds.access_token.as_deref(), Some("a"));
        assert_eq!(creds.refresh_token.as_deref(), Some("r"));
        assert!(creds.user.is_some());
    }

    pub fn clear_all_is_idempotent(store: &dyn CredentialStore) {
        store.write_tokens("a", "r").unwrap();
        store.write_identity(&sample_user()).unwrap();

        store.clear_all().unwrap();
        assert!(store.read().is_empty());

        store.clear_all().unwrap();
        assert!(store.read().is_empty());
    }
}
