//! httpecho core: runtime-agnostic error types and the request metrics registry.
//!
//! This crate carries no HTTP or async runtime dependencies so the counter
//! contract can be exercised on its own and reused by other binaries.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `EchoError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{EchoError, ExitStatus, Result};
pub use metrics::RequestMetrics;
