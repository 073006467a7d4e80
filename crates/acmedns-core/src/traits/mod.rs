// # Core Traits
//
// This module defines the seam between callers and the acme-dns service:
// - ChallengeService: registers accounts and publishes TXT challenge values

pub mod challenge_service;

pub use challenge_service::ChallengeService;
