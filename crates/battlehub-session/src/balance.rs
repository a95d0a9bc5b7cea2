//! Wallet amounts kept in the encrypted store: the signed-in user's cached
//! balance and the per-user credits recorded by payment approval.

use battlehub_core::storage::StorageBackend;
use battlehub_storage::encrypted_store::EncryptedStore;
use tracing::{info, instrument};

/// Logical key of the cached balance.
pub const BALANCE_KEY: &str = "user_balance";

pub fn cache_balance<B: StorageBackend>(store: &EncryptedStore<B>, amount: f64) {
    store.set(BALANCE_KEY, &amount);
}

/// Cached balance; zero when nothing has been fetched yet or the entry is unreadable.
pub fn cached_balance<B: StorageBackend>(store: &EncryptedStore<B>) -> f64 {
    store.get(BALANCE_KEY).unwrap_or(0.0)
}

pub fn wallet_key(user_id: &str) -> String {
    format!("user_wallet_{user_id}")
}

/// Credited balance for `user_id`; zero when absent or unreadable.
pub fn wallet_balance<B: StorageBackend>(store: &EncryptedStore<B>, user_id: &str) -> f64 {
    store.get(&wallet_key(user_id)).unwrap_or(0.0)
}

/// Credit an approved payment to `user_id` and return the new balance.
#[instrument(skip(store))]
pub fn credit_wallet<B: StorageBackend>(
    store: &EncryptedStore<B>,
    user_id: &str,
    amount: f64,
) -> f64 {
    let updated = wallet_balance(store, user_id) + amount;
    store.set(&wallet_key(user_id), &updated);
    info!(updated, "wallet credited");
    updated
}

#[cfg(test)]
mod tests {
    use battlehub_core::storage::{InMemoryStorage, StorageBackend as _};
    use battlehub_storage::secret::AppSecret;

    use super::*;

    #[test]
    fn defaults_to_zero_and_remembers_updates() {
        let store =
            EncryptedStore::new(InMemoryStorage::new(), &AppSecret::new("s")).expect("store");
        assert_eq!(cached_balance(&store), 0.0);

        cache_balance(&store, 125.5);
        assert_eq!(cached_balance(&store), 125.5);
    }

    #[test]
    fn approvals_accumulate_per_user() {
        let store =
            EncryptedStore::new(InMemoryStorage::new(), &AppSecret::new("s")).expect("store");
        assert_eq!(wallet_balance(&store, "u001"), 0.0);

        assert_eq!(credit_wallet(&store, "u001", 150.0), 150.0);
        assert_eq!(credit_wallet(&store, "u001", 100.0), 250.0);
        assert_eq!(credit_wallet(&store, "u002", 300.0), 300.0);

        assert_eq!(wallet_balance(&store, "u001"), 250.0);
        assert_eq!(cached_balance(&store), 0.0);
    }

    #[test]
    fn credits_are_stored_under_obfuscated_keys() {
        let backend = InMemoryStorage::new();
        let store = EncryptedStore::new(backend.clone(), &AppSecret::new("s")).expect("store");
        credit_wallet(&store, "u001", 50.0);

        let keys = backend.keys().expect("keys");
        assert_eq!(keys, vec![store.obfuscated_key(&wallet_key("u001"))]);
        assert!(keys.iter().all(|key| !key.contains("user_wallet")));
    }
}
