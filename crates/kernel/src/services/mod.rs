//! Domain services.
//!
//! Handlers stay thin: the rules for registrations, wishlists, profiles and
//! the cached announcement strings live here, written against the
//! [`EntityStore`](crate::store::EntityStore) and
//! [`KeyValueCache`](crate::cache::KeyValueCache) seams.

pub mod announcement;
pub mod email;
pub mod featured_speaker;
pub mod profile;
pub mod registration;
pub mod wishlist;
