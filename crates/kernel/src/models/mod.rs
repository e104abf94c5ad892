//! Stored entities.

pub mod conference;
pub mod key;
pub mod profile;
pub mod session;
pub mod speaker;

pub use conference::{Conference, ConferenceField};
pub use key::EntityKind;
pub use profile::{Profile, TeeShirtSize};
pub use session::{Session, SessionField};
pub use speaker::Speaker;
