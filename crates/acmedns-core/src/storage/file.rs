// # File Storage
//
// Persistent domain -> acme-dns delegation target mapping.
//
// ## Lifecycle
//
// - Loaded eagerly when the store is opened
// - Mutated in memory by `put`
// - Written back only on an explicit `save` (no auto-flush)
//
// ## Writes
//
// `save` truncates and rewrites the file in place. This is not a
// write-then-rename: a crash in the middle of a write can leave a corrupted
// file behind, which the next `open` reports as `StorageError::Corrupted`.
//
// ## File Format
//
// ```json
// {
//   "example.com": "d420c923-bbd7-4056-ab64-c3ca54c9b3cf.auth.example.org"
// }
// ```

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::account::normalize_domain;
use crate::config::{DEFAULT_STORAGE_PERMISSION, StorageConfig};
use crate::error::{Error, StorageError};

/// Outcome of reading the storage file
#[derive(Debug)]
enum LoadOutcome {
    /// No file at the path yet
    Missing,
    /// File exists with no content
    Empty,
    /// File parsed into a mapping
    Loaded(BTreeMap<String, String>),
}

impl LoadOutcome {
    fn into_records(self) -> BTreeMap<String, String> {
        match self {
            Self::Missing | Self::Empty => BTreeMap::new(),
            Self::Loaded(records) => records,
        }
    }
}

/// File-backed store of domain -> delegation target mappings
///
/// A single instance assumes it is the only writer of its file. Two stores
/// opened on the same path do not see each other's changes and the last
/// `save` wins.
///
/// # Example
///
/// ```rust,no_run
/// use acmedns_core::Storage;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut storage = Storage::open("/etc/acmedns/accounts.json", 0o600).await?;
///
///     storage.put("*.example.com", "abc.auth.example.org");
///     storage.save().await?;
///
///     assert_eq!(storage.fetch("example.com"), Some("abc.auth.example.org"));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Storage {
    path: PathBuf,
    permission: u32,
    records: BTreeMap<String, String>,
}

impl Storage {
    /// Open a store, loading any existing content from `path`
    ///
    /// `permission` is only applied if `save` has to create the file; the
    /// mode of an existing file is never changed.
    pub async fn open<P: AsRef<Path>>(path: P, permission: u32) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let records = Self::read_file(&path).await?.into_records();

        tracing::debug!(
            path = %path.display(),
            records = records.len(),
            "Opened acme-dns storage"
        );

        Ok(Self {
            path,
            permission,
            records,
        })
    }

    /// Open a store with the default owner-only permission
    pub async fn open_default<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::open(path, DEFAULT_STORAGE_PERMISSION).await
    }

    /// Open a store from configuration
    ///
    /// The configuration is validated first, so an out-of-range permission
    /// is rejected before any file is touched.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::open(&config.path, config.permission).await?)
    }

    /// Read the storage file from disk
    ///
    /// Returns the mapping currently on disk without touching the in-memory
    /// one. Use [`Storage::reload`] to replace it.
    pub async fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        Ok(Self::read_file(&self.path).await?.into_records())
    }

    /// Replace the in-memory mapping with the file contents
    pub async fn reload(&mut self) -> Result<(), StorageError> {
        self.records = self.load().await?;
        tracing::debug!(
            path = %self.path.display(),
            records = self.records.len(),
            "Reloaded acme-dns storage"
        );
        Ok(())
    }

    async fn read_file(path: &Path) -> Result<LoadOutcome, StorageError> {
        let content = match fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Storage file does not exist");
                return Ok(LoadOutcome::Missing);
            }
            Err(e) => {
                // Only an existing regular file is an error; anything else
                // is treated as "no storage yet"
                let is_file = fs::metadata(path)
                    .await
                    .map(|m| m.is_file())
                    .unwrap_or(false);
                if is_file {
                    return Err(StorageError::Unreadable {
                        path: path.to_path_buf(),
                        source: e,
                    });
                }
                tracing::debug!(
                    path = %path.display(),
                    error = %e,
                    "Storage path is not a regular file, starting empty"
                );
                return Ok(LoadOutcome::Missing);
            }
        };

        if content.is_empty() {
            return Ok(LoadOutcome::Empty);
        }

        let records = serde_json::from_slice(&content).map_err(|e| StorageError::Corrupted {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(LoadOutcome::Loaded(records))
    }

    /// Write the whole mapping to disk
    ///
    /// Creates the file with the configured permission if needed, otherwise
    /// truncates and overwrites it.
    pub async fn save(&self) -> Result<(), StorageError> {
        let json = serde_json::to_vec(&self.records).map_err(StorageError::Serialize)?;

        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(self.permission);

        let mut file = options.open(&self.path).await.map_err(write_err)?;
        file.write_all(&json).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        tracing::trace!(
            path = %self.path.display(),
            records = self.records.len(),
            "Storage written to file"
        );
        Ok(())
    }

    /// Map a domain to its delegation target, in memory only
    ///
    /// A leading `*.` is stripped so a wildcard shares its base domain's
    /// entry. Call [`Storage::save`] to persist.
    pub fn put(&mut self, domain: &str, destination: impl Into<String>) {
        let domain = normalize_domain(domain);
        self.records.insert(domain.to_string(), destination.into());
    }

    /// Look up the delegation target for a domain
    ///
    /// The key is matched verbatim; no wildcard normalization is applied.
    pub fn fetch(&self, domain: &str) -> Option<&str> {
        self.records.get(domain).map(String::as_str)
    }

    /// Stored domains, in sorted order
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Number of stored domains
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no domains
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path of the storage file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mode used when creating the storage file
    pub fn permission(&self) -> u32 {
        self.permission
    }
}
