//! Conference registration.
//!
//! The seat counter and the attendee list change together. Stores call
//! [`apply_registration`] inside whatever atomic unit they provide, after
//! loading both entities and before writing both back.

use crate::error::{AppResult, Conflict};
use crate::models::{Conference, Profile};

/// Direction of a registration change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOp {
    Register,
    Unregister,
}

impl RegistrationOp {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationOp::Register => "register",
            RegistrationOp::Unregister => "unregister",
        }
    }
}

/// Apply a registration change to a loaded profile and conference.
///
/// Registering twice is a conflict, as is registering with no seats left;
/// in both cases neither entity is modified. Unregistering when not
/// registered is a no-op that returns `false`.
pub fn apply_registration(
    profile: &mut Profile,
    conference: &mut Conference,
    op: RegistrationOp,
) -> AppResult<bool> {
    let key = conference.websafe_key();

    match op {
        RegistrationOp::Register => {
            if profile.is_attending(&key) {
                return Err(Conflict::AlreadyRegistered.into());
            }
            if conference.seats_available <= 0 {
                return Err(Conflict::SoldOut.into());
            }
            profile.conference_keys_to_attend.push(key);
            conference.seats_available -= 1;
            Ok(true)
        }
        RegistrationOp::Unregister => {
            let Some(pos) = profile
                .conference_keys_to_attend
                .iter()
                .position(|k| *k == key)
            else {
                return Ok(false);
            };
            profile.conference_keys_to_attend.remove(pos);
            conference.seats_available += 1;
            Ok(true)
        }
    }
}
