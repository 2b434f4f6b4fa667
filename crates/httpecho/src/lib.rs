//! Top-level facade crate for httpecho.
//!
//! Re-exports the core types and the server library so users can depend on a single crate.

pub mod core {
    pub use httpecho_core::*;
}

pub mod server {
    pub use httpecho_server::*;
}
