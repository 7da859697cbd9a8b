//! Transactional score ledger.
//!
//! A submission compares the score to the stored personal best and appends a
//! history entry; both effects commit through one atomic repository
//! primitive, guarded by the row version. The allowance window is never
//! touched on this path.

use std::sync::Arc;

use coinrush_core::{
    score::validate_submitted_name, Account, Clock, CoinrushError, LeaderboardRow, Result,
    ScoreEntry, WalletAddress, DEFAULT_LEADERBOARD_LIMIT,
};
use coinrush_store::{AccountRepository, CommitResult};
use tracing::{debug, info};

use crate::allowance::MAX_CAS_RETRIES;

/// Result of a recorded score submission
#[derive(Debug, Clone)]
pub struct ScoreSubmission {
    /// The appended history entry
    pub entry: ScoreEntry,
    /// Account row after the submission committed
    pub account: Account,
    /// Whether this submission raised the personal best
    pub is_new_personal_best: bool,
}

/// Records score submissions and serves the leaderboard
pub struct ScoreLedger {
    repo: Arc<dyn AccountRepository>,
    clock: Arc<dyn Clock>,
}

impl ScoreLedger {
    /// Create a ledger over the given repository and clock
    pub fn new(repo: Arc<dyn AccountRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Record a score for `wallet` under the submitted display name.
    ///
    /// The name is an intentional snapshot: it is stored as submitted, not
    /// joined against the account's current username.
    pub async fn submit(
        &self,
        wallet: &WalletAddress,
        score: u64,
        user_name: &str,
    ) -> Result<ScoreSubmission> {
        let name = validate_submitted_name(user_name)?;

        for _ in 0..MAX_CAS_RETRIES {
            let row = self
                .repo
                .get_account(wallet)
                .await?
                .ok_or_else(|| CoinrushError::not_found(format!("account {wallet}")))?;

            let is_new_personal_best = score > row.value.personal_best_score;
            let entry = ScoreEntry::new(wallet.clone(), score, name.clone(), self.clock.now());

            match self
                .repo
                .append_score_if_version(
                    wallet,
                    row.version,
                    is_new_personal_best.then_some(score),
                    entry.clone(),
                )
                .await?
            {
                CommitResult::Committed(committed) => {
                    if is_new_personal_best {
                        info!("New personal best {score} for {wallet}");
                    } else {
                        debug!("Recorded score {score} for {wallet}");
                    }
                    return Ok(ScoreSubmission {
                        entry,
                        account: committed.value,
                        is_new_personal_best,
                    });
                }
                CommitResult::Stale => continue,
            }
        }

        Err(CoinrushError::conflict(format!(
            "score submission for {wallet} kept losing the row version race"
        )))
    }

    /// Top scores, descending, default limit
    /// [`DEFAULT_LEADERBOARD_LIMIT`].
    pub async fn top_scores(&self, limit: Option<usize>) -> Result<Vec<LeaderboardRow>> {
        self.repo
            .top_scores(limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT))
            .await
    }
}
