//! HTTP endpoints.
//!
//! - `/`        : fixed echo text (delayed, counted)
//! - `/health`  : liveness
//! - `/metrics` : Prometheus text format

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use httpecho_core::RequestMetrics;
use serde_json::json;

use crate::app_state::AppState;
use crate::delay::ResponseDelay;

/// Echo endpoint state: only what the echo path needs.
#[derive(Clone)]
pub struct EchoHandler {
    body: Arc<str>,
    server_id: Arc<str>,
    delay: ResponseDelay,
    metrics: Arc<RequestMetrics>,
}

impl EchoHandler {
    pub fn new(state: &AppState) -> Self {
        let cfg = state.cfg();
        Self {
            body: format!("{}\n", cfg.text).into(),
            server_id: cfg.server_id.as_str().into(),
            delay: state.delay(),
            metrics: state.metrics(),
        }
    }

    /// Delay, count, then hand back the body. The order is observable: a
    /// request is only counted once its delay has elapsed.
    pub async fn respond(&self) -> String {
        self.delay.delay().await;
        self.metrics.increment(&self.server_id);
        self.body.to_string()
    }
}

pub async fn echo(State(handler): State<EchoHandler>) -> String {
    handler.respond().await
}

/// Newline-terminated like the echo body, so `Json` is not used here.
pub async fn health() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        format!("{}\n", json!({ "status": "ok" })),
    )
        .into_response()
}

pub async fn metrics(State(metrics): State<Arc<RequestMetrics>>) -> Response {
    let body = metrics.render();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
