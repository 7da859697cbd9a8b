//! Default in-memory store (intended for tests and the dev server).
//!
//! One mutex over the whole state keeps every repository method trivially
//! atomic, which is exactly the contract a production row store would
//! provide through transactions.

use std::collections::HashMap;

use async_lock::Mutex;
use async_trait::async_trait;
use coinrush_core::{
    Account, CoinrushError, LeaderboardRow, Result, ScoreEntry, WalletAddress,
};

use crate::repository::{AccountRepository, CommitResult, Versioned};

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<WalletAddress, Versioned<Account>>,
    // Append-only; leaderboard reads sort a projection of this log.
    scores: Vec<ScoreEntry>,
}

/// In-memory [`AccountRepository`]
#[derive(Default)]
pub struct MemoryAccountStore {
    state: Mutex<MemoryState>,
}

impl MemoryAccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of history entries recorded so far
    pub async fn score_count(&self) -> usize {
        self.state.lock().await.scores.len()
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountStore {
    async fn get_account(&self, wallet: &WalletAddress) -> Result<Option<Versioned<Account>>> {
        let state = self.state.lock().await;
        Ok(state.accounts.get(wallet).cloned())
    }

    async fn upsert_account(&self, account: Account) -> Result<Versioned<Account>> {
        let mut state = self.state.lock().await;
        let wallet = account.wallet_address.clone();
        let row = match state.accounts.get(&wallet) {
            Some(existing) => {
                let mut updated = account;
                updated.personal_best_score = existing.value.personal_best_score;
                Versioned {
                    value: updated,
                    version: existing.version + 1,
                }
            }
            None => Versioned {
                value: account,
                version: 1,
            },
        };
        state.accounts.insert(wallet, row.clone());
        Ok(row)
    }

    async fn update_account_if_version(
        &self,
        wallet: &WalletAddress,
        expected_version: u64,
        account: Account,
    ) -> Result<CommitResult> {
        let mut state = self.state.lock().await;
        let existing = state
            .accounts
            .get(wallet)
            .ok_or_else(|| CoinrushError::not_found(format!("account {wallet}")))?;
        if existing.version != expected_version {
            return Ok(CommitResult::Stale);
        }
        let row = Versioned {
            value: account,
            version: expected_version + 1,
        };
        state.accounts.insert(wallet.clone(), row.clone());
        Ok(CommitResult::Committed(row))
    }

    async fn append_score_if_version(
        &self,
        wallet: &WalletAddress,
        expected_version: u64,
        new_best: Option<u64>,
        entry: ScoreEntry,
    ) -> Result<CommitResult> {
        let mut state = self.state.lock().await;
        let existing = state
            .accounts
            .get(wallet)
            .ok_or_else(|| CoinrushError::not_found(format!("account {wallet}")))?;
        if existing.version != expected_version {
            return Ok(CommitResult::Stale);
        }
        let mut updated = existing.value.clone();
        if let Some(best) = new_best {
            updated.personal_best_score = best;
        }
        let row = Versioned {
            value: updated,
            version: expected_version + 1,
        };
        state.accounts.insert(wallet.clone(), row.clone());
        state.scores.push(entry);
        Ok(CommitResult::Committed(row))
    }

    async fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardRow>> {
        let state = self.state.lock().await;
        let mut rows: Vec<LeaderboardRow> = state.scores.iter().map(LeaderboardRow::from).collect();
        // Stable sort keeps insertion order among equal scores.
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        rows.truncate(limit);
        Ok(rows)
    }
}
