//! Listener lifecycle: `Starting -> Listening -> ShuttingDown -> Stopped`.
//!
//! The accept loop runs on its own task. The caller's task parks on the
//! shutdown future; once it resolves the listener stops accepting and
//! in-flight requests get `shutdown_grace` to finish. Anything still running
//! after that is abandoned to the runtime teardown.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use httpecho_core::error::{EchoError, Result};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::app_state::AppState;
use crate::config::ServerConfig;
use crate::router::build_router;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Listening,
    ShuttingDown,
    Stopped,
}

/// How the drain after a shutdown signal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every in-flight request completed within the grace period.
    Drained,
    /// The grace period ran out; remaining connections were abandoned.
    DeadlineExceeded,
}

pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    app: Router,
    grace: Duration,
}

impl Server {
    /// Bind the configured address. Failure here is final; nothing retries.
    pub async fn bind(state: &AppState) -> Result<Self> {
        let listener = bind_listener(&state.cfg().bind_addrs()).await?;
        let local_addr = listener.local_addr().map_err(|source| EchoError::Bind {
            addr: state.cfg().listen.clone(),
            source,
        })?;

        Ok(Self {
            listener,
            local_addr,
            app: build_router(state),
            grace: state.cfg().shutdown_grace,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until `shutdown` resolves, then drain within the grace period.
    ///
    /// Returns an error only when the listener dies on its own.
    pub async fn run_until<F>(self, shutdown: F) -> Result<DrainOutcome>
    where
        F: Future<Output = ()> + Send,
    {
        let Server {
            listener,
            local_addr,
            app,
            grace,
        } = self;
        let mut state = LifecycleState::Starting;

        let token = CancellationToken::new();
        let serve = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(token.clone().cancelled_owned());
        let mut serve: JoinHandle<std::io::Result<()>> = tokio::spawn(async move { serve.await });

        enter(&mut state, LifecycleState::Listening);
        tracing::info!(addr = %local_addr, "server is listening");

        tokio::select! {
            _ = shutdown => {}
            res = &mut serve => {
                enter(&mut state, LifecycleState::Stopped);
                return Err(unexpected_exit(res));
            }
        }

        enter(&mut state, LifecycleState::ShuttingDown);
        tracing::info!(?grace, "received interrupt, shutting down");
        token.cancel();

        let outcome = match tokio::time::timeout(grace, &mut serve).await {
            Ok(Ok(Ok(()))) => DrainOutcome::Drained,
            Ok(res) => {
                enter(&mut state, LifecycleState::Stopped);
                return Err(unexpected_exit(res));
            }
            Err(_) => {
                serve.abort();
                tracing::info!(?grace, "shutdown deadline exceeded, closing remaining connections");
                DrainOutcome::DeadlineExceeded
            }
        };

        enter(&mut state, LifecycleState::Stopped);
        tracing::info!(?outcome, "server stopped");
        Ok(outcome)
    }
}

/// Bind `cfg`, serve until Ctrl-C/SIGTERM, then drain.
pub async fn run(cfg: ServerConfig) -> Result<DrainOutcome> {
    let state = AppState::new(cfg)?;
    // Handlers go in before the listener exists, so no early signal is lost.
    let signal = ShutdownSignal::install()
        .map_err(|e| EchoError::Internal(format!("failed to install signal handlers: {e}")))?;
    let server = Server::bind(&state).await?;
    server.run_until(signal.recv()).await
}

/// Try each candidate in order. Only a missing address family moves on to
/// the next one; anything else (port in use, permissions) is final.
async fn bind_listener(addrs: &[String]) -> Result<TcpListener> {
    let mut candidates = addrs.iter().peekable();
    while let Some(addr) = candidates.next() {
        tracing::info!(%addr, state = ?LifecycleState::Starting, "binding listener");
        match TcpListener::bind(addr.as_str()).await {
            Ok(listener) => return Ok(listener),
            Err(e) if candidates.peek().is_some() && family_unavailable(&e) => {
                tracing::info!(%addr, error = %e, "address family unavailable, falling back");
            }
            Err(source) => {
                return Err(EchoError::Bind {
                    addr: addr.clone(),
                    source,
                })
            }
        }
    }
    Err(EchoError::InvalidConfig("no listen address".into()))
}

fn family_unavailable(e: &std::io::Error) -> bool {
    !matches!(
        e.kind(),
        std::io::ErrorKind::AddrInUse | std::io::ErrorKind::PermissionDenied
    )
}

fn enter(state: &mut LifecycleState, next: LifecycleState) {
    tracing::info!(from = ?*state, to = ?next, "lifecycle transition");
    *state = next;
}

fn unexpected_exit(
    res: std::result::Result<std::io::Result<()>, tokio::task::JoinError>,
) -> EchoError {
    match res {
        Ok(Ok(())) => EchoError::Listener("listener closed without a shutdown request".into()),
        Ok(Err(e)) => EchoError::Listener(e.to_string()),
        Err(join_err) => EchoError::Internal(format!("serve task failed: {join_err}")),
    }
}

/// OS shutdown notification: SIGINT, plus SIGTERM on unix.
///
/// Installed eagerly so signals delivered before `recv` is polled still count.
/// Only the first signal matters; the drain is not restarted by later ones.
pub struct ShutdownSignal {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    pub fn install() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    #[cfg(unix)]
    pub async fn recv(mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => tracing::info!("received SIGINT"),
            _ = self.terminate.recv() => tracing::info!("received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
