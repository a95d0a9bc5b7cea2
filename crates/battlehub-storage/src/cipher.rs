//! Key-name obfuscation and value sealing for the encrypted store.
//!
//! Two independent 256-bit keys are expanded from the application secret with
//! HKDF-SHA256: one keys the HMAC that derives storage key names, the other
//! keys AES-256-GCM for values.
//!
//! Sealed value layout (URL-safe base64, no padding):
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::secret::AppSecret;

/// Prefix marking storage keys written by the encrypted store.
pub const KEY_PREFIX: &str = "es_";

/// Number of hex characters of the keyed hash kept in a storage key.
const KEY_HASH_HEX_LEN: usize = 24;

const NONCE_LEN: usize = 12;
const DERIVED_KEY_LEN: usize = 32;

const HASH_KEY_INFO: &[u8] = b"battlehub-store:key-name";
const VALUE_KEY_INFO: &[u8] = b"battlehub-store:value";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
    #[error("encrypt failed: {0}")]
    Encrypt(String),
    #[error("sealed value is not valid base64: {0}")]
    Decode(String),
    #[error("sealed value is too short")]
    Truncated,
    #[error("decrypt failed (wrong secret or tampered value)")]
    Decrypt,
}

/// Keyed primitives derived from one `AppSecret`.
#[derive(Clone)]
pub struct StoreCipher {
    name_mac: Hmac<Sha256>,
    value_cipher: Aes256Gcm,
}

impl StoreCipher {
    pub fn new(secret: &AppSecret) -> Result<Self, CipherError> {
        let hash_key = derive(secret.as_bytes(), HASH_KEY_INFO)?;
        let value_key = derive(secret.as_bytes(), VALUE_KEY_INFO)?;

        let name_mac = <Hmac<Sha256> as Mac>::new_from_slice(&hash_key)
            .map_err(|e| CipherError::KeyDerivation(format!("hmac init: {e}")))?;
        let value_cipher = Aes256Gcm::new_from_slice(&value_key)
            .map_err(|e| CipherError::KeyDerivation(format!("cipher init: {e}")))?;

        Ok(Self {
            name_mac,
            value_cipher,
        })
    }

    /// Deterministic storage key for a logical key name.
    pub fn obfuscate(&self, name: &str) -> String {
        let mut mac = self.name_mac.clone();
        mac.update(name.as_bytes());
        let digest = mac.finalize().into_bytes();

        let mut out = String::with_capacity(KEY_PREFIX.len() + KEY_HASH_HEX_LEN);
        out.push_str(KEY_PREFIX);
        for byte in digest.iter().take(KEY_HASH_HEX_LEN / 2) {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .value_cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| CipherError::Encrypt(e.to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(nonce.as_slice());
        blob.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(blob))
    }

    /// Reverse `seal`. Fails on bad encoding, truncation, wrong key or tampering.
    pub fn open(&self, sealed: &str) -> Result<Vec<u8>, CipherError> {
        let blob = URL_SAFE_NO_PAD
            .decode(sealed)
            .map_err(|e| CipherError::Decode(e.to_string()))?;
        if blob.len() < NONCE_LEN {
            return Err(CipherError::Truncated);
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        self.value_cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CipherError::Decrypt)
    }
}

fn derive(ikm: &[u8], info: &[u8]) -> Result<[u8; DERIVED_KEY_LEN], CipherError> {
    let hk = Hkdf::<Sha256>::new(None, ikm);
    let mut okm = [0u8; DERIVED_KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| CipherError::KeyDerivation(e.to_string()))?;
    Ok(okm)
}
