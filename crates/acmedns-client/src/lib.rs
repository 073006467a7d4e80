// # acme-dns HTTP Client
//
// This crate implements `ChallengeService` against the acme-dns HTTP API.
//
// ## Behaviour
//
// - ✅ One HTTP request per call
// - ✅ Full error propagation with the status code and response body
// - ✅ Verbose diagnostics for failed updates (headers, bodies, status)
// - ❌ NO retry logic (owned by the caller)
// - ❌ NO backoff logic (owned by the caller)
// - ❌ NO timeout unless one is configured (transport default otherwise)
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - The account password NEVER appears in logs
// - The `X-Api-Key` header value is redacted in error diagnostics
//
// ## API Reference
//
// - Register: `POST /register`, optional body `{"allowfrom": [...]}`, 201 on success
// - Update: `POST /update` with `X-Api-User` / `X-Api-Key`, body
//   `{"subdomain": "...", "txt": "..."}`, 200 on success

use acmedns_core::account::{RegisterRequest, TXT_RECORD_LEN, UpdateRequest};
use acmedns_core::{ClientConfig, Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

pub use acmedns_core::{Account, ChallengeService, ClientError};

const HEADER_API_USER: &str = "X-Api-User";
const HEADER_API_KEY: &str = "X-Api-Key";
const CONTENT_TYPE_JSON: &str = "application/json";

/// acme-dns client
///
/// Holds only the base URL and a reusable HTTP connection pool; every call
/// is an independent exchange, so the client can be shared freely.
#[derive(Debug, Clone)]
pub struct AcmeDnsClient {
    /// Base URL without a trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl AcmeDnsClient {
    /// Create a client for an acme-dns instance using transport defaults
    ///
    /// # Parameters
    ///
    /// - `base_url`: URL of the acme-dns instance, e.g. `https://auth.example.org`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url))
    }

    /// Create a client from configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Base URL of the acme-dns instance
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl ChallengeService for AcmeDnsClient {
    async fn register(&self, allowfrom: &[String]) -> Result<Account, ClientError> {
        let url = self.endpoint("register");
        tracing::debug!(url = %url, allowfrom = ?allowfrom, "Registering acme-dns account");

        let mut request = self.client.post(&url);
        if !allowfrom.is_empty() {
            // Whitelisted networks go into the registration call
            request = request.json(&RegisterRequest { allowfrom });
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("POST {} failed: {}", url, e)))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(ClientError::Registration {
                status: status.as_u16(),
                body,
            });
        }

        let account: Account = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse account: {}", e)))?;

        tracing::debug!(
            subdomain = %account.subdomain,
            fulldomain = %account.fulldomain,
            "Registered acme-dns account"
        );
        Ok(account)
    }

    async fn update_txt(&self, account: &Account, txt: &str) -> Result<(), ClientError> {
        // Length is advisory only; the request is sent either way
        if txt.chars().count() != TXT_RECORD_LEN {
            tracing::warn!(
                length = txt.chars().count(),
                expected = TXT_RECORD_LEN,
                "TXT value length differs from what acme-dns accepts"
            );
        }

        let url = self.endpoint("update");
        tracing::debug!(url = %url, subdomain = %account.subdomain, "Updating acme-dns TXT record");

        let update = UpdateRequest {
            subdomain: &account.subdomain,
            txt,
        };
        let response = self
            .client
            .post(&url)
            .header(HEADER_API_USER, &account.username)
            .header(HEADER_API_KEY, &account.password)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE_JSON)
            .json(&update)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("POST {} failed: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::OK {
            tracing::debug!(subdomain = %account.subdomain, "TXT record updated");
            return Ok(());
        }

        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        Err(ClientError::Update {
            status: status.as_u16(),
            request_headers: pretty_json(&diagnostic_headers(account)),
            request_body: pretty_json(&update),
            response_body: pretty_body(&response_text),
        })
    }

    fn service_name(&self) -> &'static str {
        "acme-dns"
    }
}

/// Update request headers as shown in diagnostics
fn diagnostic_headers(account: &Account) -> BTreeMap<&'static str, &str> {
    BTreeMap::from([
        ("Content-Type", CONTENT_TYPE_JSON),
        (HEADER_API_KEY, "<REDACTED>"),
        (HEADER_API_USER, account.username.as_str()),
    ])
}

/// Pretty-print with sorted keys
///
/// Going through `Value` sorts object keys, as serde_json's map is ordered.
fn pretty_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_default()
}

/// Pretty-print a response body, keeping it verbatim if it is not JSON
fn pretty_body(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_string()),
        Err(_) => text.to_string(),
    }
}
