//! Configuration types for acme-dns clients
//!
//! Configuration can be built in code, deserialized with serde, or read from
//! environment variables:
//!
//! - `ACMEDNS_URL`: Base URL of the acme-dns instance (required)
//! - `ACMEDNS_TIMEOUT_SECS`: Request timeout (optional, transport default otherwise)
//! - `ACMEDNS_STORAGE_PATH`: Path of the storage file (default `acmedns.json`)
//! - `ACMEDNS_STORAGE_PERMISSION`: Octal mode for a newly created storage file (default `600`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::Error;

/// Default mode for a newly created storage file (owner read/write)
pub const DEFAULT_STORAGE_PERMISSION: u32 = 0o600;

/// Default storage file name
pub const DEFAULT_STORAGE_PATH: &str = "acmedns.json";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcmeDnsConfig {
    /// Network Client configuration
    pub client: ClientConfig,

    /// Persistent Store configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AcmeDnsConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("ACMEDNS_URL")
            .ok_or_else(|| Error::config("ACMEDNS_URL is required"))?;

        let timeout_secs = lookup("ACMEDNS_TIMEOUT_SECS")
            .map(|s| {
                s.trim().parse::<u64>().map_err(|e| {
                    Error::config(format!("ACMEDNS_TIMEOUT_SECS '{}' is invalid: {}", s, e))
                })
            })
            .transpose()?;

        let path = lookup("ACMEDNS_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH));

        let permission = lookup("ACMEDNS_STORAGE_PERMISSION")
            .map(|s| parse_permission(&s))
            .transpose()?
            .unwrap_or(DEFAULT_STORAGE_PERMISSION);

        let config = Self {
            client: ClientConfig::new(base_url).with_timeout_secs(timeout_secs),
            storage: StorageConfig { path, permission },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Error> {
        self.client.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

/// Network Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the acme-dns instance, e.g. `https://auth.example.org`
    pub base_url: String,

    /// Per-request timeout in seconds
    ///
    /// `None` keeps the HTTP transport's default; the library imposes no
    /// timeout policy of its own.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Create a client configuration for a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: None,
        }
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate the client configuration
    pub fn validate(&self) -> Result<(), Error> {
        if self.base_url.is_empty() {
            return Err(Error::config("acme-dns base URL cannot be empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::config(format!(
                "acme-dns base URL '{}' must start with http:// or https://",
                self.base_url
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(Error::config("acme-dns request timeout must be > 0"));
        }
        Ok(())
    }
}

/// Persistent Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the storage file
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Mode applied when the storage file has to be created
    #[serde(default = "default_storage_permission")]
    pub permission: u32,
}

impl StorageConfig {
    /// Create a storage configuration with the default permission
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            permission: DEFAULT_STORAGE_PERMISSION,
        }
    }

    /// Set the creation mode
    pub fn with_permission(mut self, permission: u32) -> Self {
        self.permission = permission;
        self
    }

    /// Validate the storage configuration
    pub fn validate(&self) -> Result<(), Error> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::config("Storage path cannot be empty"));
        }
        if self.permission > 0o7777 {
            return Err(Error::config(format!(
                "Storage permission {:o} is not a valid file mode",
                self.permission
            )));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(default_storage_path())
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORAGE_PATH)
}

fn default_storage_permission() -> u32 {
    DEFAULT_STORAGE_PERMISSION
}

/// Parse an octal mode such as `600` or `0o640`
fn parse_permission(value: &str) -> Result<u32, Error> {
    let digits = value.trim();
    let digits = digits.strip_prefix("0o").unwrap_or(digits);
    u32::from_str_radix(digits, 8).map_err(|e| {
        Error::config(format!(
            "ACMEDNS_STORAGE_PERMISSION '{}' is not an octal mode: {}",
            value, e
        ))
    })
}
