//! Allowance window resolution.
//!
//! `resolve_window` is a deterministic mapping from stored window state plus
//! an injected `now` to the effective window. It performs no I/O and never
//! mutates anything, so rollover behavior is unit-testable with arbitrary
//! clock values.

use chrono::{DateTime, Duration, Utc};

use crate::account::Account;

/// Fixed tolerance absorbing binary floating-point rounding in spend/limit
/// comparisons. Single source of truth for the whole subsystem; never use an
/// ad-hoc epsilon in a comparison.
pub const SPEND_EPSILON: f64 = 1e-9;

/// Default per-window spend cap in ETH
pub const DEFAULT_ALLOWANCE_LIMIT_ETH: f64 = 0.01;

/// Default window length
pub const DEFAULT_ALLOWANCE_PERIOD_SECONDS: u32 = 86_400;

/// Allowance parameters applied to new accounts and uninitialized windows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllowanceDefaults {
    /// Spend cap per window, in ETH
    pub limit_eth: f64,
    /// Window length in seconds
    pub period_seconds: u32,
}

impl Default for AllowanceDefaults {
    fn default() -> Self {
        Self {
            limit_eth: DEFAULT_ALLOWANCE_LIMIT_ETH,
            period_seconds: DEFAULT_ALLOWANCE_PERIOD_SECONDS,
        }
    }
}

/// Effective window state for a given `now`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWindow {
    /// When the effective window began
    pub start: DateTime<Utc>,
    /// Window length in seconds
    pub period_seconds: u32,
    /// Spend cap in ETH
    pub limit_eth: f64,
    /// Spend accumulated inside the effective window
    pub spent_eth: f64,
    /// True when the stored window was absent or expired and the effective
    /// state differs from the stored state
    pub rolled: bool,
}

/// Resolve the effective allowance window for `now`.
///
/// Uninitialized windows (any stored field absent) resolve to the defaults
/// with a fresh start; expired windows keep their limit and period but reset
/// spend and restart at `now`; live windows pass through unchanged.
pub fn resolve_window(
    stored_start: Option<DateTime<Utc>>,
    stored_period_seconds: Option<u32>,
    stored_limit_eth: Option<f64>,
    stored_spent_eth: f64,
    now: DateTime<Utc>,
    defaults: AllowanceDefaults,
) -> ResolvedWindow {
    let (start, period_seconds, limit_eth) =
        match (stored_start, stored_period_seconds, stored_limit_eth) {
            (Some(start), Some(period), Some(limit)) => (start, period, limit),
            _ => {
                return ResolvedWindow {
                    start: now,
                    period_seconds: defaults.period_seconds,
                    limit_eth: defaults.limit_eth,
                    spent_eth: 0.0,
                    rolled: true,
                };
            }
        };

    if now >= start + Duration::seconds(i64::from(period_seconds)) {
        ResolvedWindow {
            start: now,
            period_seconds,
            limit_eth,
            spent_eth: 0.0,
            rolled: true,
        }
    } else {
        ResolvedWindow {
            start,
            period_seconds,
            limit_eth,
            spent_eth: stored_spent_eth,
            rolled: false,
        }
    }
}

/// Resolve the window stored on an account row
pub fn resolve_account_window(
    account: &Account,
    now: DateTime<Utc>,
    defaults: AllowanceDefaults,
) -> ResolvedWindow {
    resolve_window(
        account.allowance_period_start,
        account.current_allowance_period_seconds,
        account.current_allowance_limit_eth,
        account.allowance_spent_this_period_eth,
        now,
        defaults,
    )
}

/// Whether spending `amount_eth` on top of `spent_eth` stays within
/// `limit_eth`, using [`SPEND_EPSILON`] as the tolerance.
pub fn fits_within_limit(spent_eth: f64, amount_eth: f64, limit_eth: f64) -> bool {
    spent_eth + amount_eth <= limit_eth + SPEND_EPSILON
}
