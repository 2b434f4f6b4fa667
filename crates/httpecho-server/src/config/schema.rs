use std::time::Duration;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use httpecho_core::error::{EchoError, Result};

/// Immutable server configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address exactly as given on the command line (`:5678`, `127.0.0.1:0`, ...).
    pub listen: String,
    pub server_id: String,
    pub delay: Duration,
    /// Fixed echo text, without the trailing newline.
    pub text: String,
    pub shutdown_grace: Duration,
    pub headers: AppHeaders,
}

impl ServerConfig {
    pub fn new(listen: impl Into<String>, server_id: impl Into<String>) -> Self {
        let listen = listen.into();
        let server_id = server_id.into();
        Self {
            text: echo_text(&listen, &server_id),
            headers: AppHeaders::for_server(&server_id),
            listen,
            server_id,
            delay: Duration::ZERO,
            shutdown_grace: default_shutdown_grace(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn with_headers(mut self, headers: AppHeaders) -> Self {
        self.headers = headers;
        self
    }

    /// Socket addresses to try, in order. A bare `:port` means every
    /// interface: the dual-stack IPv6 wildcard first, IPv4 only when the
    /// host has no IPv6.
    pub fn bind_addrs(&self) -> Vec<String> {
        if self.listen.starts_with(':') {
            vec![format!("[::]{}", self.listen), format!("0.0.0.0{}", self.listen)]
        } else {
            vec![self.listen.clone()]
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.listen.trim().is_empty() {
            return Err(EchoError::InvalidConfig("listen must not be empty".into()));
        }
        if self.shutdown_grace.is_zero() {
            return Err(EchoError::InvalidConfig(
                "shutdown grace period must be greater than zero".into(),
            ));
        }
        self.headers.to_header_map()?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(default_listen(), default_server_id())
    }
}

/// Fixed response headers set on every echo and health response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppHeaders {
    /// `X-App-Name`
    pub app_name: String,
    /// `X-App-Version`
    pub app_version: String,
    /// `X-Server-Id`; omitted when `None`.
    pub server_id: Option<String>,
    pub extra: Vec<(String, String)>,
}

impl AppHeaders {
    pub fn for_server(server_id: &str) -> Self {
        Self {
            server_id: Some(server_id.to_string()),
            ..Self::default()
        }
    }

    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((name.into(), value.into()));
        self
    }

    /// Compile into a header map, rejecting names or values that are not valid HTTP.
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        insert(&mut map, "x-app-name", &self.app_name)?;
        insert(&mut map, "x-app-version", &self.app_version)?;
        if let Some(id) = &self.server_id {
            insert(&mut map, "x-server-id", id)?;
        }
        for (name, value) in &self.extra {
            insert(&mut map, name, value)?;
        }
        Ok(map)
    }
}

impl Default for AppHeaders {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_version: crate::version::VERSION.to_string(),
            server_id: None,
            extra: Vec::new(),
        }
    }
}

fn insert(map: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let name = HeaderName::try_from(name)
        .map_err(|e| EchoError::InvalidConfig(format!("invalid header name {name:?}: {e}")))?;
    let value = HeaderValue::try_from(value).map_err(|e| {
        EchoError::InvalidConfig(format!("invalid value for header {name}: {e}"))
    })?;
    map.insert(name, value);
    Ok(())
}

/// The body served on `/`, before the trailing newline.
pub fn echo_text(listen: &str, server_id: &str) -> String {
    format!("Port: {listen}, id: {server_id}")
}

pub(crate) fn default_listen() -> String {
    ":5678".into()
}
pub(crate) fn default_server_id() -> String {
    "1".into()
}
fn default_app_name() -> String {
    "http-echo".into()
}
fn default_shutdown_grace() -> Duration {
    Duration::from_secs(5)
}
