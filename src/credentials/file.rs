use std::fs::{self, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use super::{CredentialStore, StoredCredentials};
use crate::error::CredentialError;
use crate::models::User;

/// Credentials persisted as a JSON document, readable by the owner only.
///
/// The file is read once on open and cached. Every write goes to a sibling
/// temporary file first and is renamed over the original, so a crash never
/// leaves half a document behind.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    cache: Mutex<StoredCredentials>,
}

impl FileCredentialStore {
    /// Open (or lazily create) the store at `path`.
    /// A missing file is an empty store; a corrupt one is logged and ignored.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = load(&path);
        Self {
            path,
            cache: Mutex::new(cache),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate(
        &self,
        f: impl FnOnce(&mut StoredCredentials),
    ) -> Result<(), CredentialError> {
        let mut guard = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = guard.clone();
        f(&mut next);
        persist(&self.path, &next)?;
        *guard = next;
        Ok(())
    }
}

fn load(path: &Path) -> StoredCredentials {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Credential file is corrupt, starting with an empty session"
            );
            StoredCredentials::default()
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoredCredentials::default(),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to read credential file"
            );
            StoredCredentials::default()
        }
    }
}

fn persist(path: &Path, creds: &StoredCredentials) -> Result<(), CredentialError> {
    if creds.is_empty() {
        return match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        };
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let payload = serde_json::to_vec_pretty(creds)?;
    let tmp = temp_path(path);
    let written = write_private(&tmp, &payload).and_then(|()| fs::rename(&tmp, path));
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written.map_err(CredentialError::from)
}

/// Unique per process and per write, so concurrent writers never share a
/// temporary file
fn temp_path(path: &Path) -> PathBuf {
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let name = format!(
        "{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq,
    );
    path.with_file_name(name)
}

fn write_private(path: &Path, payload: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(payload)?;
    file.sync_all()
}

impl CredentialStore for FileCredentialStore {
    fn read(&self) -> StoredCredentials {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn write_tokens(&self, access: &str, refresh: &str) -> Result<(), CredentialError> {
        self.mutate(|creds| {
            creds.access_token = Some(access.to_string());
            creds.refresh_token = Some(refresh.to_string());
        })
    }

    fn write_access_token(&self, access: &str) -> Result<(), CredentialError> {
        self.mutate(|creds| creds.access_token = Some(access.to_string()))
    }

    fn write_identity(&self, user: &User) -> Result<(), CredentialError> {
        self.mutate(|creds| creds.user = Some(user.clone()))
    }

    fn clear_all(&self) -> Result<(), CredentialError> {
        self.mutate(|creds| *creds = StoredCredentials::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::contract;

    fn store_in(dir: &tempfile::TempDir) -> FileCredentialStore {
        FileCredentialStore::open(dir.path().join("session").join("credentials.json"))
    }

    #[test]
    fn test_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        contract::empty_store_reads_absent(&store_in(&dir));
    }

    #[test]
    fn test_write_access_token_isolation() {
        let dir = tempfile::tempdir().unwrap();
        contract::write_access_token_is_isolated(&store_in(&dir));
    }

    #[test]
    fn test_write_tokens_keeps_identity() {
        let dir = tempfile::tempdir().unwrap();
        contract::write_tokens_keeps_identity(&store_in(&dir));
    }

    #[test]
    fn test_clear_all_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        contract::clear_all_is_idempotent(&store);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = store_in(&dir);
            store.write_tokens("tok1", "ref1").unwrap();
            store.write_identity(&contract::sample_user()).unwrap();
        }

        let reopened = store_in(&dir);
        let creds = reopened.read();
        assert_eq!(creds.access_token.as_deref(), Some("tok1"));
        assert_eq!(creds.refresh_token.as_deref(), Some("ref1"));
        assert_eq!(creds.user, Some(contract::sample_user()));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.write_tokens("secret-access", "secret-refresh").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_temp_paths_are_unique_and_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("credentials.json");
        assert_ne!(temp_path(&target), temp_path(&target));

        let store = FileCredentialStore::open(&target);
        store.write_tokens("tok1", "ref1").unwrap();
        store.write_access_token("tok2").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("credentials.json")]);
    }

    #[test]
    fn test_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, b"{not json").unwrap();

        let store = FileCredentialStore::open(&path);
        assert!(store.read().is_empty());

        store.write_access_token("fresh").unwrap();
        assert_eq!(
            FileCredentialStore::open(&path).access_token().as_deref(),
            Some("fresh")
        );
    }
}
