//! # Coinrush Service - Orchestration Layer
//!
//! Request-scoped units of work over the repository: account provisioning,
//! allowance-window spending, and the score ledger. Every account mutation
//! goes through a version-guarded conditional write with bounded retries, so
//! concurrent callers on the same wallet can never overspend a window or
//! regress a personal best.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Allowance window manager: lazy rollover and guarded spends
pub mod allowance;

/// Score ledger: transactional personal-best updates and history appends
pub mod ledger;

/// Idempotent account provisioning
pub mod provisioner;

pub use allowance::{AllowanceManager, SpendOutcome, MAX_CAS_RETRIES};
pub use ledger::{ScoreLedger, ScoreSubmission};
pub use provisioner::{AccountProvisioner, ProvisionRequest};
