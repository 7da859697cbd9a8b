//! Score history entries and the leaderboard projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::WalletAddress;
use crate::errors::{CoinrushError, Result};

/// Default number of rows returned by a leaderboard read
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// One immutable score submission.
///
/// `user_name_at_submission` is a snapshot of the name used when the score
/// was posted; it may diverge from the account's current username later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    /// Entry id
    pub id: Uuid,
    /// Owning account
    pub wallet_address: WalletAddress,
    /// Submitted score
    pub score: u64,
    /// Display name snapshot taken at submission time
    pub user_name_at_submission: String,
    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
}

impl ScoreEntry {
    /// Build a new entry with a fresh id
    pub fn new(
        wallet_address: WalletAddress,
        score: u64,
        user_name_at_submission: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            wallet_address,
            score,
            user_name_at_submission,
            created_at,
        }
    }
}

/// Row of the leaderboard read projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    /// Name snapshot from the underlying entry
    pub user_name: String,
    /// Score
    pub score: u64,
    /// Submission time
    pub created_at: DateTime<Utc>,
}

impl From<&ScoreEntry> for LeaderboardRow {
    fn from(entry: &ScoreEntry) -> Self {
        Self {
            user_name: entry.user_name_at_submission.clone(),
            score: entry.score,
            created_at: entry.created_at,
        }
    }
}

/// Validate the display name submitted with a score: non-empty after
/// trimming. Unlike a chosen username this is a free-form snapshot.
pub fn validate_submitted_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoinrushError::invalid("userName must be non-empty"));
    }
    Ok(trimmed.to_string())
}
