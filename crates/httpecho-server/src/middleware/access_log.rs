//! Structured access log.
//!
//! One `tracing` event per request on the `httpecho::access` target, emitted
//! before the request is handed to the inner service.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    http::{Method, Version},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, SecondsFormat, Utc};

pub const ACCESS_TARGET: &str = "httpecho::access";

/// The request facts the access log keeps. Dropped once the line is written.
#[derive(Debug, Clone)]
pub struct AccessRecord {
    pub timestamp: DateTime<Utc>,
    pub remote: Option<SocketAddr>,
    pub method: Method,
    pub path: String,
    pub version: Version,
}

impl AccessRecord {
    pub fn from_request(req: &Request) -> Self {
        Self {
            timestamp: Utc::now(),
            remote: req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            version: req.version(),
        }
    }

    pub fn remote_display(&self) -> String {
        self.remote.map_or_else(|| "-".to_string(), |a| a.to_string())
    }

    pub fn emit(&self) {
        tracing::info!(
            target: ACCESS_TARGET,
            ts = %self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            remote = %self.remote_display(),
            method = %self.method,
            path = %self.path,
            version = ?self.version,
            "request"
        );
    }
}

pub async fn access_log(req: Request, next: Next) -> Response {
    AccessRecord::from_request(&req).emit();
    next.run(req).await
}
