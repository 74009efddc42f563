//! Credential store implementations
//!
//! - [`FileCredentialStore`]: a JSON document mapping client secrets to
//!   token records, created (with its directory) on first write
//! - [`InMemoryCredentialStore`]: process-local map, for tests and
//!   short-lived tools
//!
//! On-disk layout:
//!
//! ```json
//! {
//!   "<client_secret>": {
//!     "access_token": "...",
//!     "refresh_token": "...",
//!     "created_at": "2026-01-01T00:00:00Z",
//!     "expires_in": 86400
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use amocrm_domain::{AmoError, Result};
use parking_lot::{const_mutex, Mutex, RwLock};
use tracing::debug;

use super::traits::CredentialStore;
use super::types::TokenRecord;

type RecordMap = BTreeMap<String, TokenRecord>;

/// Serializes load-modify-save across every file store in the process, so
/// clients sharing one document never drop each other's records.
static DOCUMENT_WRITE_LOCK: Mutex<()> = const_mutex(());

/// File-backed credential store
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by the document at `path`.
    ///
    /// Nothing is touched on disk until the first [`CredentialStore::put`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every stored record.
    ///
    /// # Errors
    /// Returns `AmoError::Store` if the file exists but cannot be read or is
    /// not a valid credential document.
    pub fn load_all(&self) -> Result<RecordMap> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(RecordMap::new()),
            Err(err) => {
                return Err(AmoError::Store(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )))
            }
        };

        if data.trim().is_empty() {
            return Ok(RecordMap::new());
        }

        serde_json::from_str(&data).map_err(|err| {
            AmoError::Store(format!("invalid credential document {}: {err}", self.path.display()))
        })
    }

    /// Write the whole document atomically (temp file + rename).
    fn save_all(&self, records: &RecordMap) -> Result<()> {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| {
                AmoError::Store(format!("failed to create {}: {err}", parent.display()))
            })?;
        }

        let data = serde_json::to_string_pretty(records)
            .map_err(|err| AmoError::Serialization(err.to_string()))?;

        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(
            "{}.{}.{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy(),
            std::process::id(),
            seq,
        );
        let tmp_path = self.path.with_file_name(tmp_name);

        write_private(&tmp_path, data.as_bytes())
            .map_err(|err| format!("failed to write {}: {err}", tmp_path.display()))
            .and_then(|()| {
                std::fs::rename(&tmp_path, &self.path)
                    .map_err(|err| format!("failed to replace {}: {err}", self.path.display()))
            })
            .map_err(|msg| {
                let _ = std::fs::remove_file(&tmp_path);
                AmoError::Store(msg)
            })
    }
}

/// Create `path` owner-only from the start and fill it.
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // umask can only narrow the mode; pin it to exactly 0600
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(data)?;
    file.sync_all()
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<TokenRecord>> {
        Ok(self.load_all()?.remove(key))
    }

    fn put(&self, key: &str, record: &TokenRecord) -> Result<()> {
        let _guard = DOCUMENT_WRITE_LOCK.lock();
        let mut records = self.load_all()?;
        records.insert(key.to_string(), record.clone());
        self.save_all(&records)?;

        debug!(path = %self.path.display(), records = records.len(), "Credential document written");
        Ok(())
    }
}

/// In-memory credential store
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: RwLock<HashMap<String, TokenRecord>>,
}

impl InMemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<TokenRecord>> {
        Ok(self.records.read().get(key).cloned())
    }

    fn put(&self, key: &str, record: &TokenRecord) -> Result<()> {
        self.records.write().insert(key.to_string(), record.clone());
        Ok(())
    }
}
