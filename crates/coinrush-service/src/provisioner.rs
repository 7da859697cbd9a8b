//! Account provisioning.
//!
//! The entry point that guarantees an account row exists before the
//! allowance manager or the score ledger touch it. Provisioning is an
//! upsert: calling it again for the same wallet updates the username and
//! parent linkage and deliberately restarts the allowance window with the
//! current defaults ("setup" doubles as an allowance reset). The stored
//! personal best always survives re-provisioning.

use std::sync::Arc;

use coinrush_core::{
    Account, AllowanceDefaults, Clock, CoinrushError, Result, Username, WalletAddress,
};
use coinrush_store::{AccountRepository, CommitResult};
use tracing::info;

use crate::allowance::MAX_CAS_RETRIES;

/// Raw provisioning input, validated before any repository access
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    /// Wallet address to key the account by
    pub wallet_address: String,
    /// Optional owning wallet
    pub parent_wallet_address: Option<String>,
    /// Player-chosen display name
    pub username: String,
}

/// Idempotent account creator/updater
pub struct AccountProvisioner {
    repo: Arc<dyn AccountRepository>,
    clock: Arc<dyn Clock>,
    defaults: AllowanceDefaults,
}

impl AccountProvisioner {
    /// Create a provisioner over the given repository and clock
    pub fn new(
        repo: Arc<dyn AccountRepository>,
        clock: Arc<dyn Clock>,
        defaults: AllowanceDefaults,
    ) -> Self {
        Self {
            repo,
            clock,
            defaults,
        }
    }

    /// Create or update the account row for `request.wallet_address`.
    ///
    /// Single upsert write; safe to call repeatedly.
    pub async fn provision(&self, request: ProvisionRequest) -> Result<Account> {
        let wallet = WalletAddress::parse(&request.wallet_address)?;
        let parent = request
            .parent_wallet_address
            .as_deref()
            .map(WalletAddress::parse)
            .transpose()?;
        let username = Username::chosen(&request.username)?;

        let now = self.clock.now();
        let account = Account {
            wallet_address: wallet.clone(),
            parent_wallet_address: parent,
            username,
            // The store keeps the stored best on the update path.
            personal_best_score: 0,
            current_allowance_limit_eth: Some(self.defaults.limit_eth),
            current_allowance_period_seconds: Some(self.defaults.period_seconds),
            allowance_period_start: Some(now),
            allowance_spent_this_period_eth: 0.0,
        };

        let row = self.repo.upsert_account(account).await?;
        info!("Provisioned account {wallet}, allowance window restarted");
        Ok(row.value)
    }

    /// Change the display name only.
    ///
    /// Unlike [`provision`](Self::provision), this touches nothing but the
    /// username: the allowance window keeps running and the personal best is
    /// untouched.
    pub async fn update_username(
        &self,
        wallet: &WalletAddress,
        new_username: &str,
    ) -> Result<Account> {
        let username = Username::chosen(new_username)?;

        for _ in 0..MAX_CAS_RETRIES {
            let row = self
                .repo
                .get_account(wallet)
                .await?
                .ok_or_else(|| CoinrushError::not_found(format!("account {wallet}")))?;

            let mut updated = row.value.clone();
            updated.username = username.clone();
            match self
                .repo
                .update_account_if_version(wallet, row.version, updated)
                .await?
            {
                CommitResult::Committed(committed) => {
                    info!("Renamed account {wallet}");
                    return Ok(committed.value);
                }
                CommitResult::Stale => continue,
            }
        }

        Err(CoinrushError::conflict(format!(
            "username update for {wallet} kept losing the row version race"
        )))
    }
}
