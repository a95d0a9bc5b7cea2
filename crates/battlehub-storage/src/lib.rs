//! Encrypted key-value store layered over a `StorageBackend`.
//! Key names are obfuscated with HMAC-SHA256 and values sealed with AES-256-GCM,
//! both keyed from a single application secret.

pub mod cipher;
pub mod encrypted_store;
pub mod file_backend;
pub mod secret;
