//! Account repository interface.
//!
//! Models an external transactional row store: versioned reads, an atomic
//! upsert, conditional single-row writes, and one multi-statement primitive
//! for the score transaction. Transient backend failures surface as the
//! retryable `Store` error kind, never as silent success.

use async_trait::async_trait;
use coinrush_core::{Account, LeaderboardRow, Result, ScoreEntry, WalletAddress};

/// A stored value together with its row version.
///
/// The version increments on every committed write and is the guard for all
/// conditional updates.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    /// The stored value
    pub value: T,
    /// Row version at read time
    pub version: u64,
}

/// Outcome of a conditional write
#[derive(Debug, Clone, PartialEq)]
pub enum CommitResult {
    /// The write committed; carries the new row state
    Committed(Versioned<Account>),
    /// The row version moved since the read; nothing was written
    Stale,
}

/// Durable account store.
///
/// Implementations must make each method atomic on its own: `upsert_account`
/// is a single create-or-update, and `append_score_if_version` covers the
/// best-score update and the history append in one transaction.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Read an account row with its version, `None` when absent
    async fn get_account(&self, wallet: &WalletAddress) -> Result<Option<Versioned<Account>>>;

    /// Create the row or replace it.
    ///
    /// On the update path the stored `personal_best_score` wins over the
    /// argument's; every other field is taken from `account`. Returns the
    /// committed row.
    async fn upsert_account(&self, account: Account) -> Result<Versioned<Account>>;

    /// Replace the row if its version still equals `expected_version`.
    ///
    /// Fails `NotFound` when the row no longer exists.
    async fn update_account_if_version(
        &self,
        wallet: &WalletAddress,
        expected_version: u64,
        account: Account,
    ) -> Result<CommitResult>;

    /// Atomically raise the personal best (when `new_best` is set) and
    /// append `entry` to the score history, guarded by `expected_version`.
    ///
    /// Fails `NotFound` when the row no longer exists. On `Stale` neither
    /// the account nor the history is touched.
    async fn append_score_if_version(
        &self,
        wallet: &WalletAddress,
        expected_version: u64,
        new_best: Option<u64>,
        entry: ScoreEntry,
    ) -> Result<CommitResult>;

    /// Top `limit` scores, descending, ties in insertion order
    async fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardRow>>;
}
