//! acme-dns account record and API request bodies

use serde::{Deserialize, Serialize};

/// Length acme-dns requires for TXT challenge values
///
/// The ACME DNS-01 key authorization digest is a base64url-encoded SHA-256
/// hash without padding, which is always 43 characters long.
pub const TXT_RECORD_LEN: usize = 43;

/// Label prepended to a domain to form its DNS-01 validation record name
pub const ACME_CHALLENGE_LABEL: &str = "_acme-challenge";

/// Strip a leading wildcard label from a domain
///
/// A wildcard certificate for `*.example.com` is validated through the same
/// `_acme-challenge.example.com` record as `example.com` itself.
pub fn normalize_domain(domain: &str) -> &str {
    domain.strip_prefix("*.").unwrap_or(domain)
}

/// Credentials issued by acme-dns on registration
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Service-assigned subdomain identifier (a UUID)
    pub subdomain: String,

    /// API user, sent as `X-Api-User`
    pub username: String,

    /// API key, sent as `X-Api-Key`
    /// ⚠️ NEVER log this value
    pub password: String,

    /// Fully qualified name the `_acme-challenge` CNAME must point at
    pub fulldomain: String,

    /// CIDR ranges allowed to update this account
    #[serde(default)]
    pub allowfrom: Vec<String>,
}

impl Account {
    /// Delegation target for the caller's challenge record
    pub fn delegation_target(&self) -> &str {
        &self.fulldomain
    }

    /// Name of the record that should be CNAMEd to [`Self::delegation_target`]
    ///
    /// ```rust
    /// use acmedns_core::account::Account;
    ///
    /// let account = Account {
    ///     subdomain: "abc".into(),
    ///     username: "u".into(),
    ///     password: "p".into(),
    ///     fulldomain: "abc.auth.example.org".into(),
    ///     allowfrom: Vec::new(),
    /// };
    /// assert_eq!(
    ///     account.challenge_record_name("*.example.com"),
    ///     "_acme-challenge.example.com"
    /// );
    /// ```
    pub fn challenge_record_name(&self, domain: &str) -> String {
        format!("{}.{}", ACME_CHALLENGE_LABEL, normalize_domain(domain))
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("subdomain", &self.subdomain)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("fulldomain", &self.fulldomain)
            .field("allowfrom", &self.allowfrom)
            .finish()
    }
}

/// Body of `POST /register` when networks are whitelisted
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub allowfrom: &'a [String],
}

/// Body of `POST /update`
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRequest<'a> {
    pub subdomain: &'a str,
    pub txt: &'a str,
}
