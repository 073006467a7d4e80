//! Test doubles and common utilities for contract tests

#![allow(dead_code)]

use acmedns_core::{Account, ChallengeService, ClientError};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A ChallengeService that hands out sequential accounts and records updates
pub struct RecordingService {
    register_call_count: AtomicUsize,
    updates: Mutex<Vec<(String, String)>>,
    /// Status to fail updates with, if any
    fail_updates_with: Option<u16>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self {
            register_call_count: AtomicUsize::new(0),
            updates: Mutex::new(Vec::new()),
            fail_updates_with: None,
        }
    }

    /// A service whose updates are all rejected with `status`
    pub fn failing_updates(status: u16) -> Self {
        Self {
            fail_updates_with: Some(status),
            ..Self::new()
        }
    }

    pub fn register_call_count(&self) -> usize {
        self.register_call_count.load(Ordering::SeqCst)
    }

    /// Recorded (subdomain, txt) pairs, in call order
    pub fn updates(&self) -> Vec<(String, String)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChallengeService for RecordingService {
    async fn register(&self, allowfrom: &[String]) -> Result<Account, ClientError> {
        let n = self.register_call_count.fetch_add(1, Ordering::SeqCst);
        let subdomain = format!("sub{}", n);
        Ok(Account {
            fulldomain: format!("{}.auth.example.org", subdomain),
            subdomain,
            username: format!("user{}", n),
            password: format!("pass{}", n),
            allowfrom: allowfrom.to_vec(),
        })
    }

    async fn update_txt(&self, account: &Account, txt: &str) -> Result<(), ClientError> {
        if let Some(status) = self.fail_updates_with {
            return Err(ClientError::Update {
                status,
                request_headers: String::new(),
                request_body: String::new(),
                response_body: String::new(),
            });
        }
        self.updates
            .lock()
            .unwrap()
            .push((account.subdomain.clone(), txt.to_string()));
        Ok(())
    }

    fn service_name(&self) -> &'static str {
        "recording"
    }
}

/// A 43-character challenge value
pub fn token(seed: char) -> String {
    std::iter::repeat(seed).take(acmedns_core::TXT_RECORD_LEN).collect()
}
