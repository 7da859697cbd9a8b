//! # Coinrush Server - HTTP Surface
//!
//! Thin axum layer over `coinrush-service`: JSON handlers, request
//! validation at the boundary, and the error-to-status mapping. All state is
//! injected; the binary in `main.rs` wires the in-memory store, the system
//! clock, and the allowance defaults together.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Error-to-response mapping and the strict JSON extractor
pub mod error;

/// Route handlers and wire types
pub mod handlers;

/// Router construction and the serve loop
pub mod server;

pub use error::{ApiError, ApiJson};
pub use server::{router, serve, AppState};
