// # acme-dns Real Environment Validation Tool
//
// Exercises the HTTP client against a real acme-dns instance: registers an
// account, records the delegation in the storage file, and publishes a TXT
// value for it.
//
// ## Usage
//
// ```bash
// ACMEDNS_URL=https://auth.example.org \
// ACMEDNS_DOMAIN=example.com \
// ACMEDNS_STORAGE_PATH=/tmp/acmedns.json \
// cargo run --bin acmedns_validation
// ```
//
// ## Environment Variables
//
// Required:
// - `ACMEDNS_URL`: Base URL of the acme-dns instance
// - `ACMEDNS_DOMAIN`: Domain the delegation is recorded for
//
// Optional:
// - `ACMEDNS_ALLOWFROM`: Comma-separated CIDR ranges to whitelist
// - `ACMEDNS_TXT`: Challenge value to publish (43 chars, a dummy otherwise)
// - `ACMEDNS_TIMEOUT_SECS`, `ACMEDNS_STORAGE_PATH`, `ACMEDNS_STORAGE_PERMISSION`
// - `ACMEDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)

use acmedns_client::{AcmeDnsClient, ChallengeService};
use acmedns_core::{AcmeDnsConfig, Storage, TXT_RECORD_LEN};
use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn log_level() -> Result<Level> {
    let level = env::var("ACMEDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "ACMEDNS_LOG_LEVEL '{}' is invalid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let level = match log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::from(1);
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitCode::from(1);
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("✗ Validation failed: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run() -> Result<()> {
    info!("=== acme-dns Real Environment Validation ===");

    let config = AcmeDnsConfig::from_env().context("Invalid configuration")?;
    let domain = env::var("ACMEDNS_DOMAIN").context("ACMEDNS_DOMAIN is required")?;
    let allowfrom: Vec<String> = env::var("ACMEDNS_ALLOWFROM")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let txt = env::var("ACMEDNS_TXT")
        .unwrap_or_else(|_| std::iter::repeat('A').take(TXT_RECORD_LEN).collect());

    info!("Configuration:");
    info!("  Instance: {}", config.client.base_url);
    info!("  Domain: {}", domain);
    info!("  Storage: {}", config.storage.path.display());
    info!("  Allow from: {:?}", allowfrom);

    info!("--- Step 1: Opening Storage ---");
    let mut storage = Storage::from_config(&config.storage).await?;
    if let Some(existing) = storage.fetch(acmedns_core::normalize_domain(&domain)) {
        warn!("Domain already delegated to {}, it will be replaced", existing);
    }

    info!("--- Step 2: Registering Account ---");
    let client = AcmeDnsClient::from_config(&config.client)?;
    let account = client.register(&allowfrom).await?;
    info!("✓ Registered {}", account.fulldomain);
    info!("  Username: {}", account.username);
    info!("  Password: (not shown for security)");

    info!("--- Step 3: Saving Delegation ---");
    storage.put(&domain, account.delegation_target());
    storage.save().await?;
    info!(
        "✓ {} CNAME {}",
        account.challenge_record_name(&domain),
        account.delegation_target()
    );

    info!("--- Step 4: Publishing TXT Value ---");
    client.update_txt(&account, &txt).await?;
    info!("✓ TXT record updated");

    info!("=== Validation Summary ===");
    info!("✓ Registration: OK");
    info!("✓ Storage: OK ({} domains)", storage.len());
    info!("✓ TXT update: OK");
    info!("Verify with: dig TXT {}", account.fulldomain);

    Ok(())
}
