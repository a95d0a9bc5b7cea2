use std::{path::PathBuf, sync::Arc};

use battlehub_session::{Navigator, SessionGate};
use battlehub_storage::{
    encrypted_store::EncryptedStore,
    file_backend::FileStorage,
    secret::{EnvSecretProvider, KeyringSecretProvider, SecretProvider},
};
use color_eyre::Result;
use dirs::data_dir;
use tracing::debug;

use crate::config::{Config, SecretSourceKind};

/// Resolve the default data directory for BattleHub.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("battlehub"))
}

pub fn data_dir_from_config(config: &Config) -> Result<PathBuf> {
    match &config.data_dir {
        Some(root) => Ok(root.clone()),
        None => default_data_dir(),
    }
}

/// Secret provider selected by config.
pub fn secret_provider(config: &Config) -> Box<dyn SecretProvider> {
    match config.secret_source() {
        SecretSourceKind::Env => Box::new(EnvSecretProvider::new(config.secret_env_var())),
        SecretSourceKind::Keyring => {
            Box::new(KeyringSecretProvider::new("battlehub-cli", "store-secret"))
        }
    }
}

/// Build the encrypted store using config overrides.
pub fn store_from_config(config: &Config) -> Result<EncryptedStore<FileStorage>> {
    let root = data_dir_from_config(config)?;
    debug!(?root, "initializing encrypted store");
    let provider = secret_provider(config);
    EncryptedStore::with_provider(FileStorage::in_dir(root), provider.as_ref())
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))
}

/// Build the session gate every command shares.
pub fn gate_from_config(
    config: &Config,
    navigator: Arc<dyn Navigator>,
) -> Result<Arc<SessionGate<FileStorage>>> {
    let store = store_from_config(config)?;
    Ok(Arc::new(SessionGate::new(Arc::new(store), navigator)))
}

/// Helper for tests to construct a store rooted at a temp dir with a fixed secret.
#[cfg(test)]
pub fn test_store(root: impl Into<PathBuf>) -> EncryptedStore<FileStorage> {
    use battlehub_storage::secret::AppSecret;

    EncryptedStore::new(FileStorage::in_dir(root.into()), &AppSecret::new("test"))
        .expect("test store")
}
