//! HTTP route handlers.

pub mod conference;
pub mod cron;
pub mod health;
mod helpers;
pub mod metrics;
pub mod profile;
pub mod session;
pub mod speaker;
pub mod wishlist;
