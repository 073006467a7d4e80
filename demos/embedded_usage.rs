//! Minimal embedding example for acmedns-core
//!
//! Shows the caller-side flow an ACME client hook runs for a DNS-01
//! challenge. The service here is an in-process stand-in, so no acme-dns
//! instance is needed.

use acmedns_core::{Account, ChallengeService, ClientError, Result, Storage, TXT_RECORD_LEN};
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-process acme-dns stand-in
struct EmbeddedService {
    registrations: AtomicUsize,
}

impl EmbeddedService {
    fn new() -> Self {
        Self {
            registrations: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl ChallengeService for EmbeddedService {
    async fn register(&self, allowfrom: &[String]) -> Result<Account, ClientError> {
        let n = self.registrations.fetch_add(1, Ordering::SeqCst);
        println!("[Embedded] Registering account #{} (allowfrom: {:?})", n, allowfrom);

        Ok(Account {
            subdomain: format!("embedded-{}", n),
            username: format!("user-{}", n),
            password: "embedded-password".to_string(),
            fulldomain: format!("embedded-{}.auth.example.org", n),
            allowfrom: allowfrom.to_vec(),
        })
    }

    async fn update_txt(&self, account: &Account, txt: &str) -> Result<(), ClientError> {
        println!("[Embedded] TXT {} -> {}", account.fulldomain, txt);
        Ok(())
    }

    fn service_name(&self) -> &'static str {
        "embedded"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Embedded acmedns-core Example ===\n");

    let path = std::env::temp_dir().join(format!("acmedns-embedded-{}.json", std::process::id()));
    let service = EmbeddedService::new();
    let domain = "*.example.com";

    println!("1. Opening storage at {}...", path.display());
    let mut storage = Storage::open(&path, 0o600).await?;

    println!("2. Registering with {}...", service.service_name());
    let account = service.register(&["192.0.2.0/24".to_string()]).await?;

    storage.put(domain, account.delegation_target());
    storage.save().await?;
    println!("3. Stored delegation for {}", domain);

    // A fresh instance sees what was saved, under the base domain
    let storage = Storage::open(&path, 0o600).await?;
    let target = storage
        .fetch("example.com")
        .unwrap_or_else(|| account.delegation_target());

    println!("\n4. Point this record at acme-dns before validating:");
    println!("   {} CNAME {}\n", account.challenge_record_name(domain), target);

    println!("5. Publishing challenge value...");
    let token: String = std::iter::repeat('x').take(TXT_RECORD_LEN).collect();
    service.update_txt(&account, &token).await?;

    let _ = tokio::fs::remove_file(&path).await;

    println!("\n=== Embedding Successful ===");
    println!("Key Points:");
    println!("- The service and the storage never call each other");
    println!("- Nothing is persisted until save() is called");
    println!("- A wildcard and its base domain share one entry");

    Ok(())
}
