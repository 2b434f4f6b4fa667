//! Server configuration: command-line parsing and the immutable `ServerConfig`.

pub mod cli;
pub mod schema;

pub use cli::{Args, Invocation};
pub use schema::{AppHeaders, ServerConfig};
