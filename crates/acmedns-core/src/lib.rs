// # acmedns-core
//
// Core library for acme-dns clients.
//
// ## Architecture Overview
//
// - **Account**: Credentials issued by acme-dns on registration
// - **ChallengeService**: Trait for the registration/update protocol,
//   implemented over HTTP by the `acmedns-client` crate
// - **Storage**: File-backed mapping from domain to delegation target
//
// The service and the storage never call each other. The caller registers an
// account, records `domain -> fulldomain` in the storage, and later looks the
// domain up again to know which account to update.

pub mod account;
pub mod config;
pub mod error;
pub mod storage;
pub mod traits;

// Re-export core types for convenience
pub use account::{Account, TXT_RECORD_LEN, normalize_domain};
pub use config::{AcmeDnsConfig, ClientConfig, StorageConfig};
pub use error::{ClientError, Error, Result, StorageError};
pub use storage::Storage;
pub use traits::ChallengeService;
