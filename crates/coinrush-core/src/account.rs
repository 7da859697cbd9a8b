//! Account row types: wallet addresses, usernames, and the account record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::allowance::ResolvedWindow;
use crate::errors::{CoinrushError, Result};

/// Prefix reserved for system-generated placeholder names.
///
/// A player-chosen username must never start with it; the prefix is how the
/// wire format distinguishes "setup incomplete" from a real display name.
pub const RESERVED_NAME_PREFIX: &str = "Player_";

/// Maximum username length in characters (after trimming)
pub const USERNAME_MAX_CHARS: usize = 20;

/// Wallet address identifying one account row.
///
/// Format check only: `0x` prefix followed by at least one hex digit. No
/// checksum or signature verification happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse and validate a raw address string
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .ok_or_else(|| CoinrushError::invalid("wallet address must start with 0x"))?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoinrushError::invalid(
                "wallet address must be 0x followed by hex digits",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name state for an account.
///
/// The reserved-prefix convention from the wire format is kept only at the
/// serialization boundary; internally the default-vs-chosen distinction is
/// this explicit enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Username {
    /// System-assigned placeholder, shown until the player picks a name
    Default(String),
    /// Player-chosen display name
    Chosen(String),
}

impl Username {
    /// Validate a player-chosen name: 1-20 trimmed characters, reserved
    /// prefix rejected.
    pub fn chosen(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();
        if len == 0 || len > USERNAME_MAX_CHARS {
            return Err(CoinrushError::invalid(format!(
                "username must be 1-{USERNAME_MAX_CHARS} characters"
            )));
        }
        if trimmed.starts_with(RESERVED_NAME_PREFIX) {
            return Err(CoinrushError::invalid(format!(
                "username cannot start with '{RESERVED_NAME_PREFIX}'"
            )));
        }
        Ok(Self::Chosen(trimmed.to_string()))
    }

    /// Placeholder name derived from the wallet address tail
    pub fn default_for(wallet: &WalletAddress) -> Self {
        // Addresses are ASCII by construction, so byte slicing is safe.
        let addr = wallet.as_str();
        let tail = &addr[addr.len().saturating_sub(4)..];
        Self::Default(format!("{RESERVED_NAME_PREFIX}{tail}"))
    }

    /// The display string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default(name) | Self::Chosen(name) => name,
        }
    }

    /// Whether this is still the system-assigned placeholder
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default(_))
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Username {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        if name.starts_with(RESERVED_NAME_PREFIX) {
            Ok(Self::Default(name))
        } else {
            Ok(Self::Chosen(name))
        }
    }
}

/// One account row, keyed by wallet address.
///
/// The allowance fields are nullable only for rows written before the window
/// was first initialized; `resolve_window` treats such rows as expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Primary key, immutable once created
    pub wallet_address: WalletAddress,
    /// Optional back-reference to the owning wallet
    pub parent_wallet_address: Option<WalletAddress>,
    /// Current display name
    pub username: Username,
    /// Maximum score ever recorded for this account, monotonically
    /// non-decreasing
    pub personal_best_score: u64,
    /// Cap on spend within the current window, in ETH
    #[serde(rename = "currentAllowanceLimitETH")]
    pub current_allowance_limit_eth: Option<f64>,
    /// Length of the rolling window
    pub current_allowance_period_seconds: Option<u32>,
    /// When the current window began
    pub allowance_period_start: Option<DateTime<Utc>>,
    /// Spend accumulated inside the current window, in ETH
    #[serde(rename = "allowanceSpentThisPeriodETH")]
    pub allowance_spent_this_period_eth: f64,
}

impl Account {
    /// Overwrite the four window fields from a resolved window
    pub fn apply_window(&mut self, window: &ResolvedWindow) {
        self.current_allowance_limit_eth = Some(window.limit_eth);
        self.current_allowance_period_seconds = Some(window.period_seconds);
        self.allowance_period_start = Some(window.start);
        self.allowance_spent_this_period_eth = window.spent_eth;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_address_accepts_hex_with_prefix() {
        let addr = WalletAddress::parse(" 0xAbC123 ").unwrap();
        assert_eq!(addr.as_str(), "0xAbC123");
    }

    #[test]
    fn wallet_address_rejects_bad_forms() {
        assert!(WalletAddress::parse("").is_err());
        assert!(WalletAddress::parse("abc123").is_err());
        assert!(WalletAddress::parse("0x").is_err());
        assert!(WalletAddress::parse("0xNOPE").is_err());
    }

    #[test]
    fn chosen_username_is_trimmed_and_bounded() {
        assert_eq!(Username::chosen("  Ada  ").unwrap().as_str(), "Ada");
        assert!(Username::chosen("").is_err());
        assert!(Username::chosen("   ").is_err());
        assert!(Username::chosen(&"x".repeat(21)).is_err());
        assert_eq!(
            Username::chosen(&"x".repeat(20)).unwrap().as_str(),
            "x".repeat(20)
        );
    }

    #[test]
    fn reserved_prefix_is_rejected_for_chosen_names() {
        assert!(Username::chosen("Player_1").is_err());
        // Only the exact prefix is reserved
        assert!(Username::chosen("player_1").is_ok());
    }

    #[test]
    fn default_name_carries_the_reserved_prefix() {
        let wallet = WalletAddress::parse("0xdeadbeef").unwrap();
        let name = Username::default_for(&wallet);
        assert!(name.is_default());
        assert_eq!(name.as_str(), "Player_beef");
    }

    #[test]
    fn username_roundtrips_through_serde_by_prefix() {
        let chosen: Username = serde_json::from_str("\"Ada\"").unwrap();
        assert!(!chosen.is_default());
        let default: Username = serde_json::from_str("\"Player_1a2b\"").unwrap();
        assert!(default.is_default());
        assert_eq!(serde_json::to_string(&chosen).unwrap(), "\"Ada\"");
    }
}
