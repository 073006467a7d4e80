//! Error types for acme-dns clients
//!
//! The Network Client fails with [`ClientError`] and the Persistent Store
//! fails with [`StorageError`]. [`Error`] wraps both (plus configuration
//! problems) so that callers orchestrating the two can use `?` throughout.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for acme-dns operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type
#[derive(Error, Debug)]
pub enum Error {
    /// Communication with the acme-dns instance failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Reading or writing the persistent storage failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Errors returned by the acme-dns Network Client
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request could not be sent, or the response could not be read
    #[error("Request to acme-dns failed: {0}")]
    Transport(String),

    /// `/register` answered with something other than 201
    #[error(
        "Encountered an error while trying to register a new acme-dns account. \
         HTTP status {status}, Response body: {body}"
    )]
    Registration {
        /// HTTP status code returned by the service
        status: u16,
        /// Raw response body
        body: String,
    },

    /// `/update` answered with something other than 200
    ///
    /// `request_headers` shows `X-Api-Key` as `<REDACTED>`; the raw API key
    /// is never part of the message.
    #[error(
        "Encountered an error while trying to update TXT record in acme-dns.\n\
         ------- Request headers:\n{request_headers}\n\
         ------- Request body:\n{request_body}\n\
         ------- Response HTTP status: {status}\n\
         ------- Response body: {response_body}"
    )]
    Update {
        /// HTTP status code returned by the service
        status: u16,
        /// Pretty-printed request headers, keys sorted, API key redacted
        request_headers: String,
        /// Pretty-printed request body, keys sorted
        request_body: String,
        /// Pretty-printed response body, or the raw text if it is not JSON
        response_body: String,
    },

    /// The service reported success but the body could not be understood
    #[error("Invalid response from acme-dns: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// HTTP status code of the failed exchange, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Registration { status, .. } | Self::Update { status, .. } => Some(*status),
            Self::Transport(_) | Self::InvalidResponse(_) => None,
        }
    }
}

/// Errors returned by the Persistent Store
#[derive(Error, Debug)]
pub enum StorageError {
    /// The storage file is present but could not be read
    #[error("Storage file {} exists but cannot be read: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The storage file is non-empty and not a JSON object of strings
    #[error("Storage JSON in {} is corrupted: {source}", path.display())]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Opening or writing the storage file failed
    #[error("Could not write storage file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory mapping could not be serialized
    #[error("Failed to serialize storage: {0}")]
    Serialize(#[source] serde_json::Error),
}
