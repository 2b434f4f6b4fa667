//! Request middleware applied to the echo and health routes.
//!
//! Composition order (outermost first): access log, header injection, handler.

pub mod access_log;
pub mod headers;

pub use access_log::{access_log, AccessRecord, ACCESS_TARGET};
pub use headers::inject_headers;
