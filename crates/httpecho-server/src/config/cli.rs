//! Command-line surface.
//!
//! Long flags are accepted with a single dash (`-listen=:5678`, `-id 2`) as
//! well as the usual double dash.

use std::ffi::OsString;
use std::time::Duration;

use clap::{builder::BoolishValueParser, ArgAction, Parser};
use httpecho_core::error::{EchoError, Result};

use super::schema::{default_listen, default_server_id, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "http-echo", about = "Echo a fixed text over HTTP")]
pub struct Args {
    /// address and port to listen
    #[arg(long, default_value_t = default_listen())]
    pub listen: String,

    /// Server id
    #[arg(long, default_value_t = default_server_id())]
    pub id: String,

    /// optional delay in milliseconds to apply to each response
    #[arg(long, default_value_t = 0)]
    pub delay: u64,

    /// display version information (`-version`, `-version=true|false`)
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub version: bool,

    /// Rejected; kept so extra arguments reach validation instead of a parse error.
    #[arg(hide = true)]
    pub rest: Vec<String>,
}

/// What the process was asked to do.
#[derive(Debug)]
pub enum Invocation {
    /// Print the version and exit.
    Version,
    /// Run the server.
    Serve(ServerConfig),
}

impl Args {
    /// Parse an argv (program name first) after rewriting single-dash long flags.
    pub fn try_parse_normalized<I, T>(argv: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_flags(argv))
    }

    pub fn into_invocation(self) -> Result<Invocation> {
        // Version wins over everything else, including stray arguments.
        if self.version {
            return Ok(Invocation::Version);
        }
        if !self.rest.is_empty() {
            return Err(EchoError::TooManyArguments);
        }

        let cfg = ServerConfig::new(self.listen, self.id)
            .with_delay(Duration::from_millis(self.delay));
        cfg.validate()?;
        Ok(Invocation::Serve(cfg))
    }
}

/// Rewrite `-name[=value]` into `--name[=value]`. Short flags (`-h`), `--`
/// and everything after a `--` terminator are left alone.
pub fn normalize_flags<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut terminated = false;
    for (i, arg) in argv.into_iter().map(Into::into).enumerate() {
        if i == 0 || terminated {
            out.push(arg);
            continue;
        }
        let rewritten = match arg.to_str() {
            Some("--") => {
                terminated = true;
                None
            }
            Some(s) if is_single_dash_long(s) => Some(OsString::from(format!("-{s}"))),
            _ => None,
        };
        out.push(rewritten.unwrap_or(arg));
    }
    out
}

fn is_single_dash_long(s: &str) -> bool {
    let Some(name) = s.strip_prefix('-') else {
        return false;
    };
    if name.starts_with('-') {
        return false;
    }
    let name = name.split('=').next().unwrap_or(name);
    name.len() > 1 && name.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
}
