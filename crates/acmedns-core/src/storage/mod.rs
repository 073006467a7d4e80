// # Storage
//
// Persistent mapping from a caller's domain to the acme-dns delegation
// target its `_acme-challenge` record is CNAMEd to.

pub mod file;

pub use file::Storage;
