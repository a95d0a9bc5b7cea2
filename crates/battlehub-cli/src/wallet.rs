use battlehub_api::{models::WithdrawRequest, ApiClient, ApiError};
use battlehub_core::{session::SessionRecord, storage::StorageBackend};
use battlehub_session::{
    balance::{cache_balance, cached_balance},
    SessionGate,
};
use color_eyre::Result;
use tracing::warn;

/// Show the wallet balance, refreshing the cached value from the backend.
pub async fn show<B: StorageBackend>(gate: &SessionGate<B>, api: &ApiClient) -> Result<()> {
    let session = require_session(gate)?;
    match api.user_profile(&session.user_id).await {
        Ok(profile) => {
            cache_balance(gate.store(), profile.wallet_balance);
            println!("Balance: Rs.{:.2}", profile.wallet_balance);
            println!("UPI id: {}", profile.upi.as_deref().unwrap_or("(not set)"));
        }
        Err(ApiError::Unauthorized) => {
            color_eyre::eyre::bail!("session expired; run `battlehub login` again")
        }
        Err(err) => {
            warn!("balance fetch failed: {err}");
            println!("Balance (cached): Rs.{:.2}", cached_balance(gate.store()));
        }
    }
    Ok(())
}

pub async fn withdraw<B: StorageBackend>(
    gate: &SessionGate<B>,
    api: &ApiClient,
    amount: f64,
) -> Result<()> {
    let session = require_session(gate)?;
    let profile = api
        .user_profile(&session.user_id)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    cache_balance(gate.store(), profile.wallet_balance);

    let request = WithdrawRequest {
        user_id: session.user_id,
        amount,
        upi_id: profile.upi.unwrap_or_default(),
    };
    api.withdraw(&request, profile.wallet_balance)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    println!("Withdraw request of Rs.{amount:.2} submitted.");
    Ok(())
}

pub async fn set_upi<B: StorageBackend>(
    gate: &SessionGate<B>,
    api: &ApiClient,
    upi_id: &str,
) -> Result<()> {
    let session = require_session(gate)?;
    api.update_upi(&session.user_id, upi_id)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    println!("UPI id updated.");
    Ok(())
}

pub(crate) fn require_session<B: StorageBackend>(gate: &SessionGate<B>) -> Result<SessionRecord> {
    gate.current_session()
        .ok_or_else(|| color_eyre::eyre::eyre!("not signed in; run `battlehub login` first"))
}
