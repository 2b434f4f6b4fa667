//! Shared application state for the echo server.
//!
//! Built once at startup from an immutable `ServerConfig`. Header compilation
//! happens here so a bad header aborts startup instead of failing per request.

use std::sync::Arc;

use axum::http::HeaderMap;
use httpecho_core::error::Result;
use httpecho_core::RequestMetrics;

use crate::config::ServerConfig;
use crate::delay::ResponseDelay;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<RequestMetrics>,
}

struct AppStateInner {
    cfg: ServerConfig,
    headers: Arc<HeaderMap>,
}

impl AppState {
    /// Build application state with a fresh metrics registry.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        Self::with_metrics(cfg, Arc::new(RequestMetrics::new()))
    }

    /// Build application state around an existing registry.
    pub fn with_metrics(cfg: ServerConfig, metrics: Arc<RequestMetrics>) -> Result<Self> {
        cfg.validate()?;
        let headers = Arc::new(cfg.headers.to_header_map()?);
        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, headers }),
            metrics,
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn headers(&self) -> Arc<HeaderMap> {
        Arc::clone(&self.inner.headers)
    }

    pub fn delay(&self) -> ResponseDelay {
        ResponseDelay::new(self.inner.cfg.delay)
    }

    pub fn metrics(&self) -> Arc<RequestMetrics> {
        Arc::clone(&self.metrics)
    }
}
