// # Challenge Service Trait
//
// Defines the interface of an acme-dns instance.
//
// ## Implementations
//
// - HTTP: `acmedns-client` crate (`POST /register`, `POST /update`)
//
// ## Usage
//
// ```rust,ignore
// use acmedns_core::{ChallengeService, Storage};
//
// async fn provision(service: &dyn ChallengeService, storage: &mut Storage) -> acmedns_core::Result<()> {
//     let account = service.register(&[]).await?;
//     storage.put("*.example.com", account.delegation_target());
//     storage.save().await?;
//
//     service.update_txt(&account, "LHDhK3oGRvkiefQnx7OOczTY5Tic_xZ6HcMOc_gmtoM").await?;
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::account::Account;
use crate::error::ClientError;

/// Trait for acme-dns service implementations
///
/// Each call is a single request/response exchange. Implementations hold no
/// mutable state, so one instance can be shared by concurrent callers.
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (owned by the caller)
/// - ❌ Access the `Storage` (the caller orchestrates both)
/// - ❌ Spawn tasks or threads
#[async_trait]
pub trait ChallengeService: Send + Sync {
    /// Register a new account
    ///
    /// # Parameters
    ///
    /// - `allowfrom`: CIDR ranges allowed to update the account. An empty
    ///   slice registers without restrictions.
    ///
    /// # Returns
    ///
    /// - `Ok(Account)`: Credentials issued by the service
    /// - `Err(ClientError)`: Any non-201 response or transport failure
    async fn register(&self, allowfrom: &[String]) -> Result<Account, ClientError>;

    /// Publish a TXT challenge value for an account
    ///
    /// # Parameters
    ///
    /// - `account`: Account whose subdomain is updated
    /// - `txt`: Challenge value. acme-dns requires exactly
    ///   [`TXT_RECORD_LEN`](crate::account::TXT_RECORD_LEN) (43) characters;
    ///   the length is the caller's responsibility and is not enforced here.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The service answered 200
    /// - `Err(ClientError)`: Any other response or transport failure
    async fn update_txt(&self, account: &Account, txt: &str) -> Result<(), ClientError>;

    /// Name of the implementation, for logging
    fn service_name(&self) -> &'static str;
}
