//! Conclave kernel library.
//!
//! Conference management: profiles, conferences, sessions, speakers and
//! wishlists behind a JSON API. The `conclave` binary wires this library to
//! PostgreSQL and Redis; the integration tests drive [`app`] over the
//! in-memory backends.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod form;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod query;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the application router with authentication and request metrics.
///
/// CORS and request tracing are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::metrics::router())
        .merge(routes::cron::router())
        .merge(routes::profile::router())
        .merge(routes::conference::router())
        .merge(routes::session::router())
        .merge(routes::speaker::router())
        .merge(routes::wishlist::router())
        // Middleware layers (last added = first executed in request flow):
        // track_requests → authenticate_bearer_token → routes
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate_bearer_token,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::track_requests,
        ))
        .with_state(state)
}
