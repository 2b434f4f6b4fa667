//! Axum router wiring.
//!
//! `/` (plus every unrouted path) and `/health` sit behind the access-log and
//! header middleware; `/metrics` is mounted outside of both.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::any,
    Router,
};

use crate::{app_state::AppState, middleware, ops};

pub fn build_router(state: &AppState) -> Router {
    let app: Router = Router::new()
        .route("/", any(ops::echo))
        .fallback(ops::echo)
        .with_state(ops::EchoHandler::new(state))
        .route("/health", any(ops::health))
        // Later layers wrap earlier ones: access log ends up outermost.
        .layer(from_fn_with_state(state.headers(), middleware::inject_headers))
        .layer(from_fn(middleware::access_log));

    Router::new()
        .route("/metrics", any(ops::metrics))
        .with_state(state.metrics())
        .merge(app)
}
