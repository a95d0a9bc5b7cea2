//! Host key-value storage contract and an in-memory implementation.

mod backend;

pub use backend::{InMemoryStorage, StorageBackend, StorageError};
