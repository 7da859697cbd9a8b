//! Allowance window manager.
//!
//! Reads an account, resolves the effective window for the injected clock,
//! and commits spends and rollovers as single version-guarded writes. Two
//! callers racing on one wallet can both find a spend affordable in their
//! reads, but only one conditional write commits; the loser re-reads and
//! re-evaluates against the new total.

use std::sync::Arc;

use coinrush_core::{
    fits_within_limit, resolve_account_window, Account, AllowanceDefaults, Clock, CoinrushError,
    Result, WalletAddress,
};
use coinrush_store::{AccountRepository, CommitResult};
use tracing::{debug, warn};

/// Conditional-write attempts per request before giving up with `Conflict`
pub const MAX_CAS_RETRIES: usize = 3;

/// Result of a successful spend
#[derive(Debug, Clone)]
pub struct SpendOutcome {
    /// The committed account row
    pub account: Account,
    /// Window spend total after this spend
    pub new_spent_total: f64,
}

/// Orchestrates window rollover and spend validation for one repository
pub struct AllowanceManager {
    repo: Arc<dyn AccountRepository>,
    clock: Arc<dyn Clock>,
    defaults: AllowanceDefaults,
}

impl AllowanceManager {
    /// Create a manager over the given repository and clock
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

    /// Read an account, persisting a lazy rollover when its window has
    /// expired.
    ///
    /// The rollover write is conditional on the row version; losing the race
    /// just means another request already rolled the window, so the fresh
    /// read is returned instead.
    pub async fn fetch_account(&self, wallet: &WalletAddress) -> Result<Account> {
        for _ in 0..MAX_CAS_RETRIES {
            let row = self
                .repo
                .get_account(wallet)
                .await?
                .ok_or_else(|| CoinrushError::not_found(format!("account {wallet}")))?;

            let window = resolve_account_window(&row.value, self.clock.now(), self.defaults);
            if !window.rolled {
                return Ok(row.value);
            }

            let mut updated = row.value.clone();
            updated.apply_window(&window);
            match self
                .repo
                .update_account_if_version(wallet, row.version, updated)
                .await?
            {
                CommitResult::Committed(committed) => {
                    debug!("Rolled allowance window for {wallet} on read");
                    return Ok(committed.value);
                }
                CommitResult::Stale => continue,
            }
        }
        Err(CoinrushError::conflict(format!(
            "allowance rollover for {wallet} kept losing the row version race"
        )))
    }

    /// Validate and record a spend against the effective window.
    ///
    /// A rollover triggered by this request is durable even when the spend
    /// itself is rejected: the window boundary is a fact independent of
    /// whether this particular spend fits.
    pub async fn try_spend(&self, wallet: &WalletAddress, amount_eth: f64) -> Result<SpendOutcome> {
        if !amount_eth.is_finite() || amount_eth <= 0.0 {
            return Err(CoinrushError::invalid(
                "amount must be a positive finite number",
            ));
        }

        for _ in 0..MAX_CAS_RETRIES {
            let row = self
                .repo
                .get_account(wallet)
                .await?
                .ok_or_else(|| CoinrushError::not_found(format!("account {wallet}")))?;

            let window = resolve_account_window(&row.value, self.clock.now(), self.defaults);

            if !fits_within_limit(window.spent_eth, amount_eth, window.limit_eth) {
                // Reject the spend, but commit a rollover this request
                // happened to observe. Stale here means another writer moved
                // the row first; re-evaluate from their state.
                if window.rolled {
                    let mut updated = row.value.clone();
                    updated.apply_window(&window);
                    match self
                        .repo
                        .update_account_if_version(wallet, row.version, updated)
                        .await?
                    {
                        CommitResult::Committed(_) => {}
                        CommitResult::Stale => continue,
                    }
                }
                warn!(
                    "Rejected spend of {amount_eth} ETH for {wallet}: {} + {amount_eth} exceeds limit {}",
                    window.spent_eth, window.limit_eth
                );
                return Err(CoinrushError::limit_exceeded(format!(
                    "spend of {amount_eth} ETH would exceed the window limit of {} ETH",
                    window.limit_eth
                )));
            }

            let new_total = window.spent_eth + amount_eth;
            let mut updated = row.value.clone();
            updated.apply_window(&window);
            updated.allowance_spent_this_period_eth = new_total;

            match self
                .repo
                .update_account_if_version(wallet, row.version, updated)
                .await?
            {
                CommitResult::Committed(committed) => {
                    debug!("Recorded spend of {amount_eth} ETH for {wallet}, total {new_total}");
                    return Ok(SpendOutcome {
                        account: committed.value,
                        new_spent_total: new_total,
                    });
                }
                CommitResult::Stale => continue,
            }
        }

        Err(CoinrushError::conflict(format!(
            "spend for {wallet} kept losing the row version race"
        )))
    }
}
