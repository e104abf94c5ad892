//! HTTP middleware components.
//!
//! Provides bearer authentication and request metrics layers.

pub mod auth;
pub mod metrics;

pub use auth::{AuthUser, TokenVerifier, authenticate_bearer_token};
pub use metrics::track_requests;
