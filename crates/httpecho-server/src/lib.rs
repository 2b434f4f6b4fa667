//! httpecho server library entry.
//!
//! Wires configuration, the delay policy, the echo/health/metrics endpoints,
//! the middleware chain, and the listener lifecycle into one axum stack. It is
//! consumed by the `http-echo` binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod delay;
pub mod middleware;
pub mod ops;
pub mod router;
pub mod server;
pub mod version;
