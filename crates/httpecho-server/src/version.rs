//! Build version information.

/// Crate version baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Human-readable version line, e.g. `http-echo v0.1.0`.
pub fn human_version() -> String {
    format!("http-echo v{VERSION}")
}
