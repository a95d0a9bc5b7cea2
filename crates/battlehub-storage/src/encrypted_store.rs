use battlehub_core::storage::StorageBackend;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{instrument, warn};

use crate::{
    cipher::{CipherError, StoreCipher},
    secret::{AppSecret, SecretError, SecretProvider},
};

/// Result of a read that keeps "absent" and "unreadable" apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome<T> {
    Value(T),
    Empty,
    /// Present but could not be read: backend failure, bad ciphertext, wrong
    /// secret or a payload of another type.
    Corrupted(String),
}

impl<T> ReadOutcome<T> {
    /// Collapse to the fail-closed public contract: anything but a value is `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            ReadOutcome::Value(value) => Some(value),
            ReadOutcome::Empty | ReadOutcome::Corrupted(_) => None,
        }
    }

    pub fn is_corrupted(&self) -> bool {
        matches!(self, ReadOutcome::Corrupted(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreInitError {
    #[error("secret provider: {0}")]
    Secret(#[from] SecretError),
    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Key-value store that obfuscates key names and encrypts JSON values on top of
/// any `StorageBackend`.
///
/// No operation returns an error: failures are logged and reads fail closed to
/// `None`. Use [`EncryptedStore::read`] when corruption must be told apart from
/// absence.
pub struct EncryptedStore<B: StorageBackend> {
    backend: B,
    cipher: StoreCipher,
}

impl<B: StorageBackend> EncryptedStore<B> {
    pub fn new(backend: B, secret: &AppSecret) -> Result<Self, CipherError> {
        Ok(Self {
            backend,
            cipher: StoreCipher::new(secret)?,
        })
    }

    pub fn with_provider(
        backend: B,
        provider: &dyn SecretProvider,
    ) -> Result<Self, StoreInitError> {
        let secret = provider.resolve()?;
        Ok(Self::new(backend, &secret)?)
    }

    /// Storage key that `key` is persisted under.
    pub fn obfuscated_key(&self, key: &str) -> String {
        self.cipher.obfuscate(key)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Serialize, encrypt and persist `value` under `key`, overwriting any previous value.
    #[instrument(level = "debug", skip_all, fields(key = %key))]
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(reason) = self.try_set(key, value) {
            warn!(%reason, "encrypted store write failed");
        }
    }

    /// Read `key`; `None` means absent or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read(key).into_option()
    }

    /// Read `key`, reporting whether a missing value was absent or unreadable.
    #[instrument(level = "debug", skip_all, fields(key = %key))]
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> ReadOutcome<T> {
        let storage_key = self.cipher.obfuscate(key);
        let sealed = match self.backend.get_item(&storage_key) {
            Ok(Some(sealed)) if !sealed.is_empty() => sealed,
            Ok(_) => return ReadOutcome::Empty,
            Err(err) => return corrupted(err.to_string()),
        };

        let plaintext = match self.cipher.open(&sealed) {
            Ok(plaintext) => plaintext,
            Err(err) => return corrupted(err.to_string()),
        };

        match serde_json::from_slice(&plaintext) {
            Ok(value) => ReadOutcome::Value(value),
            Err(err) => corrupted(format!("payload decode failed: {err}")),
        }
    }

    /// Erase `key`. Removing a missing key is a no-op.
    #[instrument(level = "debug", skip_all, fields(key = %key))]
    pub fn remove(&self, key: &str) {
        let storage_key = self.cipher.obfuscate(key);
        if let Err(err) = self.backend.remove_item(&storage_key) {
            warn!(reason = %err, "encrypted store remove failed");
        }
    }

    fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), String> {
        let json = serde_json::to_vec(value).map_err(|e| format!("serialize failed: {e}"))?;
        let sealed = self.cipher.seal(&json).map_err(|e| e.to_string())?;
        self.backend
            .set_item(&self.cipher.obfuscate(key), &sealed)
            .map_err(|e| e.to_string())
    }
}

fn corrupted<T>(reason: String) -> ReadOutcome<T> {
    warn!(%reason, "encrypted store read failed; treating entry as absent");
    ReadOutcome::Corrupted(reason)
}
