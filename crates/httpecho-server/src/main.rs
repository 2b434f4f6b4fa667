//! http-echo
//!
//! Serves a fixed text on `/`, a liveness payload on `/health` and request
//! counters on `/metrics`. Stops on Ctrl-C/SIGTERM with exit status 2.

use std::io::IsTerminal;
use std::process::ExitCode;

use httpecho_core::ExitStatus;
use tracing_subscriber::{fmt, EnvFilter};

use httpecho_server::{
    config::{Args, Invocation},
    server, version,
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse_normalized(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let cfg = match args.into_invocation() {
        Ok(Invocation::Version) => {
            eprintln!("{}", version::human_version());
            return ExitCode::from(ExitStatus::Version.code());
        }
        Ok(Invocation::Serve(cfg)) => cfg,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(e.exit_status().code());
        }
    };

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    tracing::info!(listen = %cfg.listen, id = %cfg.server_id, delay = ?cfg.delay, "http-echo starting");

    match server::run(cfg).await {
        // Interrupted is never a clean exit, however the drain went.
        Ok(_) => ExitCode::from(ExitStatus::Interrupted.code()),
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::from(e.exit_status().code())
        }
    }
}
