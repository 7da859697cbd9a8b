//! # Coinrush Store - Repository Layer
//!
//! **Purpose**: Define the durable-store interface the services run against,
//! plus the in-memory reference implementation.
//!
//! The store is the authority for consistency: every mutation of an account
//! row is expressed as a single conditional write guarded by a row version,
//! and the score transaction is one atomic primitive. Services never get a
//! read-modify-write path that the store cannot arbitrate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// In-memory store implementation
pub mod memory;

/// Repository trait and versioning types
pub mod repository;

pub use memory::MemoryAccountStore;
pub use repository::{AccountRepository, CommitResult, Versioned};
