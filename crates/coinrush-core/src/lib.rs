//! # Coinrush Core - Foundation (Domain Crate)
//!
//! **Purpose**: Define the account/score domain types and the pure allowance
//! window logic shared by every other layer.
//!
//! This crate is the foundation of the workspace and depends on no other
//! workspace crate.
//!
//! - YES wallet address and username types with their validation rules
//! - YES account and score-entry data model
//! - YES pure allowance-window resolution (deterministic, injectable `now`)
//! - YES the unified error type
//! - NO repository implementations (that's `coinrush-store`)
//! - NO request orchestration (that's `coinrush-service`)
//! - NO HTTP surface (that's `coinrush-server`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Wallet address, username, and account row types
pub mod account;

/// Allowance window resolution and spend/limit arithmetic
pub mod allowance;

/// Wall-clock abstraction so window logic can be tested with injected time
pub mod clock;

/// Unified error type
pub mod errors;

/// Score entries and leaderboard projections
pub mod score;

pub use account::{Account, Username, WalletAddress, RESERVED_NAME_PREFIX};
pub use allowance::{
    fits_within_limit, resolve_account_window, resolve_window, AllowanceDefaults, ResolvedWindow,
    SPEND_EPSILON,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{CoinrushError, Result};
pub use score::{LeaderboardRow, ScoreEntry, DEFAULT_LEADERBOARD_LIMIT};
