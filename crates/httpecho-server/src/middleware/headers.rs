use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Set the configured app headers on the response, whatever the inner
/// handler produced.
pub async fn inject_headers(
    State(headers): State<Arc<HeaderMap>>,
    req: Request,
    next: Next,
) -> Response {
    let mut res = next.run(req).await;
    let out = res.headers_mut();
    for (name, value) in headers.iter() {
        out.insert(name.clone(), value.clone());
    }
    res
}
