//! Shared error type across httpecho crates.

use thiserror::Error;

/// Process exit statuses (stable, external tooling depends on them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Version query answered.
    Version,
    /// Stopped by a shutdown signal. Never reported as success.
    Interrupted,
    /// Malformed flag value, rejected by the parser.
    Usage,
    /// Positional arguments were supplied.
    BadArguments,
    /// Unrecoverable runtime failure (bind, listener).
    Fatal,
}

impl ExitStatus {
    /// Numeric status handed to the OS.
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Version => 0,
            ExitStatus::Fatal => 1,
            ExitStatus::Usage | ExitStatus::Interrupted => 2,
            ExitStatus::BadArguments => 127,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, EchoError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum EchoError {
    #[error("Too many arguments!")]
    TooManyArguments,
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server exited with: {0}")]
    Listener(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl EchoError {
    /// Map the error to the status the process exits with.
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            EchoError::TooManyArguments => ExitStatus::BadArguments,
            EchoError::InvalidConfig(_) => ExitStatus::Usage,
            EchoError::Bind { .. } | EchoError::Listener(_) | EchoError::Internal(_) => {
                ExitStatus::Fatal
            }
        }
    }
}
