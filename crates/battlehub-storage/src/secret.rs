use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use tracing::warn;

/// Environment variable consulted for the application secret.
pub const SECRET_ENV_VAR: &str = "BATTLEHUB_APP_SECRET";

/// Development-only secret used when nothing else is configured.
pub const DEV_FALLBACK_SECRET: &str = "default_dev_secret";

/// Where a resolved secret came from. Used for logging; never log the secret itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    Environment,
    Keyring,
    Fallback,
    Provided,
}

/// Process-wide secret that keys both name obfuscation and value encryption.
#[derive(Clone, PartialEq, Eq)]
pub struct AppSecret {
    source: SecretSource,
    bytes: Vec<u8>,
}

impl AppSecret {
    /// Wrap caller-supplied secret material (tests, config overrides).
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            source: SecretSource::Provided,
            bytes: secret.as_ref().to_vec(),
        }
    }

    pub fn source(&self) -> SecretSource {
        self.source
    }

    pub fn is_fallback(&self) -> bool {
        self.source == SecretSource::Fallback
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn with_source(source: SecretSource, secret: impl AsRef<[u8]>) -> Self {
        Self {
            source,
            bytes: secret.as_ref().to_vec(),
        }
    }
}

impl fmt::Debug for AppSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSecret")
            .field("source", &self.source)
            .field("bytes", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("keyring error: {0}")]
    Keyring(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Supplies the application secret (environment in the browser build; keychain natively).
pub trait SecretProvider: Send + Sync {
    fn resolve(&self) -> Result<AppSecret, SecretError>;
}

/// Reads the secret from an environment variable, falling back to a hardcoded
/// development value. The fallback is obfuscation only and logs a warning.
#[derive(Debug, Clone)]
pub struct EnvSecretProvider {
    var: String,
    fallback: String,
}

impl EnvSecretProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            fallback: DEV_FALLBACK_SECRET.to_string(),
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    fn resolve_with<F>(&self, lookup: F) -> AppSecret
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(&self.var).filter(|value| !value.is_empty()) {
            Some(value) => AppSecret::with_source(SecretSource::Environment, value),
            None => {
                warn!(
                    var = %self.var,
                    "application secret not set; using the development fallback"
                );
                AppSecret::with_source(SecretSource::Fallback, &self.fallback)
            }
        }
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new(SECRET_ENV_VAR)
    }
}

impl SecretProvider for EnvSecretProvider {
    fn resolve(&self) -> Result<AppSecret, SecretError> {
        Ok(self.resolve_with(|var| std::env::var(var).ok()))
    }
}

/// OS keyring-backed provider. Generates a random per-installation secret on first use.
pub struct KeyringSecretProvider {
    service: String,
    account: String,
}

impl KeyringSecretProvider {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }
}

impl SecretProvider for KeyringSecretProvider {
    fn resolve(&self) -> Result<AppSecret, SecretError> {
        let entry = keyring::Entry::new(&self.service, &self.account).map_err(keyring_error)?;

        // The mock store forgets everything between entries; a secret kept there
        // would change on every run and orphan all stored values.
        if entry
            .get_credential()
            .downcast_ref::<keyring::mock::MockCredential>()
            .is_some()
        {
            return Err(SecretError::Keyring(
                "no persistent credential store is available on this platform".to_string(),
            ));
        }

        get_or_create(
            || match entry.get_password() {
                Ok(stored) => Ok(Some(stored)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(keyring_error(e)),
            },
            |encoded| entry.set_password(encoded).map_err(keyring_error),
        )
    }
}

/// Return the stored secret, generating and storing one only when the slot is empty.
/// Any other load failure is an error; re-keying would orphan existing values.
fn get_or_create<L, S>(load: L, store: S) -> Result<AppSecret, SecretError>
where
    L: FnOnce() -> Result<Option<String>, SecretError>,
    S: FnOnce(&str) -> Result<(), SecretError>,
{
    if let Some(stored) = load()? {
        return decode_secret(&stored);
    }

    let bytes = generate_secret();
    store(&general_purpose::STANDARD.encode(bytes))?;
    Ok(AppSecret::with_source(SecretSource::Keyring, bytes))
}

fn keyring_error(err: keyring::Error) -> SecretError {
    SecretError::Keyring(err.to_string())
}

/// Provider that always returns the same secret.
#[derive(Debug, Clone)]
pub struct StaticSecretProvider {
    secret: AppSecret,
}

impl StaticSecretProvider {
    pub fn new(secret: AppSecret) -> Self {
        Self { secret }
    }
}

impl SecretProvider for StaticSecretProvider {
    fn resolve(&self) -> Result<AppSecret, SecretError> {
        Ok(self.secret.clone())
    }
}

fn generate_secret() -> [u8; 32] {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

fn decode_secret(stored: &str) -> Result<AppSecret, SecretError> {
    let bytes = general_purpose::STANDARD
        .decode(stored)
        .map_err(|e| SecretError::Decode(e.to_string()))?;

    if bytes.len() != 32 {
        return Err(SecretError::Decode(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(AppSecret::with_source(SecretSource::Keyring, bytes))
}
