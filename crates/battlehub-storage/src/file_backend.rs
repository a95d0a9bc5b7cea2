use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use battlehub_core::storage::{StorageBackend, StorageError};
use tempfile::NamedTempFile;
use tracing::instrument;

/// Durable backend holding every entry in a single JSON object file.
/// Writes go through a temp file and rename so a crash never leaves a torn file.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backend stored as `storage.json` under `root`.
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self.lock.lock().map_err(unavailable)?;
        let mut map = read_map(&self.path)?;
        if mutate(&mut map) {
            write_map(&self.path, &map)?;
        }
        Ok(())
    }
}

impl StorageBackend for FileStorage {
    #[instrument(level = "trace", skip_all)]
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(unavailable)?;
        Ok(read_map(&self.path)?.remove(key))
    }

    #[instrument(level = "trace", skip_all)]
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
            true
        })
    }

    #[instrument(level = "trace", skip_all)]
    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.update(|map| map.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let _guard = self.lock.lock().map_err(unavailable)?;
        Ok(read_map(&self.path)?.into_keys().collect())
    }
}

fn read_map(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(err) => return Err(unavailable(err)),
    };
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&contents).map_err(|e| StorageError::Corrupted {
        reason: format!("{}: {e}", path.display()),
    })
}

fn write_map(path: &Path, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
    let parent = path.parent().ok_or_else(|| StorageError::Unavailable {
        reason: "invalid storage path".to_string(),
    })?;
    fs::create_dir_all(parent).map_err(unavailable)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(unavailable)?;
    let json = serde_json::to_vec_pretty(map).map_err(unavailable)?;
    tmp.write_all(&json).map_err(unavailable)?;
    tmp.flush().map_err(unavailable)?;
    tmp.persist(path).map_err(|e| unavailable(e.error))?;
    Ok(())
}

fn unavailable<E: ToString>(err: E) -> StorageError {
    StorageError::Unavailable {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encrypted_store::EncryptedStore, secret::AppSecret};

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::in_dir(dir.path());

        assert_eq!(storage.get_item("k").expect("get"), None);
        assert!(storage.keys().expect("keys").is_empty());
        storage.remove_item("k").expect("remove on missing file");
        assert!(!storage.path().exists());
    }

    #[test]
    fn persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        FileStorage::in_dir(dir.path())
            .set_item("k", "v")
            .expect("set");

        let reopened = FileStorage::in_dir(dir.path());
        assert_eq!(reopened.get_item("k").expect("get"), Some("v".to_string()));
        assert_eq!(reopened.keys().expect("keys"), vec!["k".to_string()]);
    }

    #[test]
    fn creates_nested_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().join("a/b/storage.json"));
        storage.set_item("k", "v").expect("set");
        assert!(storage.path().exists());
    }

    #[test]
    fn malformed_file_is_reported_as_corrupted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::in_dir(dir.path());
        fs::write(storage.path(), "{ not json").expect("write junk");

        let err = storage.get_item("k").expect_err("junk must not parse");
        assert!(matches!(err, StorageError::Corrupted { .. }));
    }

    #[test]
    fn encrypted_store_survives_restart_with_same_secret() {
        let dir = tempfile::tempdir().expect("tempdir");
        let secret = AppSecret::new("restart");

        EncryptedStore::new(FileStorage::in_dir(dir.path()), &secret)
            .expect("store")
            .set("user_balance", &250);

        let reopened =
            EncryptedStore::new(FileStorage::in_dir(dir.path()), &secret).expect("store");
        assert_eq!(reopened.get::<i64>("user_balance"), Some(250));

        let on_disk = fs::read_to_string(reopened.backend().path()).expect("read file");
        assert!(!on_disk.contains("user_balance"));
    }
}
