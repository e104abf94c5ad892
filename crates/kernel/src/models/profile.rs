//! User profile model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// T-shirt size, stored and transmitted by its upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeeShirtSize {
    #[default]
    NotSpecified,
    XsM,
    XsW,
    SM,
    SW,
    MM,
    MW,
    LM,
    LW,
    XlM,
    XlW,
    XxlM,
    XxlW,
    XxxlM,
    XxxlW,
}

impl TeeShirtSize {
    const ALL: [TeeShirtSize; 15] = [
        TeeShirtSize::NotSpecified,
        TeeShirtSize::XsM,
        TeeShirtSize::XsW,
        TeeShirtSize::SM,
        TeeShirtSize::SW,
        TeeShirtSize::MM,
        TeeShirtSize::MW,
        TeeShirtSize::LM,
        TeeShirtSize::LW,
        TeeShirtSize::XlM,
        TeeShirtSize::XlW,
        TeeShirtSize::XxlM,
        TeeShirtSize::XxlW,
        TeeShirtSize::XxxlM,
        TeeShirtSize::XxxlW,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TeeShirtSize::NotSpecified => "NOT_SPECIFIED",
            TeeShirtSize::XsM => "XS_M",
            TeeShirtSize::XsW => "XS_W",
            TeeShirtSize::SM => "S_M",
            TeeShirtSize::SW => "S_W",
            TeeShirtSize::MM => "M_M",
            TeeShirtSize::MW => "M_W",
            TeeShirtSize::LM => "L_M",
            TeeShirtSize::LW => "L_W",
            TeeShirtSize::XlM => "XL_M",
            TeeShirtSize::XlW => "XL_W",
            TeeShirtSize::XxlM => "XXL_M",
            TeeShirtSize::XxlW => "XXL_W",
            TeeShirtSize::XxxlM => "XXXL_M",
            TeeShirtSize::XxxlW => "XXXL_W",
        }
    }
}

impl fmt::Display for TeeShirtSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown t-shirt size: {0}")]
pub struct UnknownTeeShirtSize(String);

impl FromStr for TeeShirtSize {
    type Err = UnknownTeeShirtSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| UnknownTeeShirtSize(s.to_string()))
    }
}

impl TryFrom<String> for TeeShirtSize {
    type Error = UnknownTeeShirtSize;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Per-user profile, keyed by the caller's user id.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Profile {
    pub user_id: String,
    pub display_name: Option<String>,
    pub main_email: Option<String>,
    #[sqlx(try_from = "String")]
    pub tee_shirt_size: TeeShirtSize,
    /// Websafe keys of conferences the user registered for.
    pub conference_keys_to_attend: Vec<String>,
    /// Websafe keys of wishlisted sessions.
    pub sessions_wishlist: Vec<String>,
}

impl Profile {
    /// A fresh profile for a first-time caller.
    pub fn new(user_id: &str, display_name: &str, main_email: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: Some(display_name.to_string()),
            main_email: Some(main_email.to_string()),
            tee_shirt_size: TeeShirtSize::default(),
            conference_keys_to_attend: Vec::new(),
            sessions_wishlist: Vec::new(),
        }
    }

    pub fn is_attending(&self, conference_key: &str) -> bool {
        self.conference_keys_to_attend
            .iter()
            .any(|k| k == conference_key)
    }

    pub fn has_wishlisted(&self, session_key: &str) -> bool {
        self.sessions_wishlist.iter().any(|k| k == session_key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn tee_shirt_names_round_trip_through_serde() {
        for size in TeeShirtSize::ALL {
            let json = serde_json::to_string(&size).unwrap();
            assert_eq!(json, format!("\"{}\"", size.as_str()));
            assert_eq!(size.as_str().parse::<TeeShirtSize>().unwrap(), size);
        }
    }

    #[test]
    fn unknown_tee_shirt_size_is_rejected() {
        assert!("XXXXL_M".parse::<TeeShirtSize>().is_err());
    }

    #[test]
    fn new_profile_defaults() {
        let profile = Profile::new("ada@example.com", "ada", "ada@example.com");
        assert_eq!(profile.tee_shirt_size, TeeShirtSize::NotSpecified);
        assert!(profile.conference_keys_to_attend.is_empty());
        assert!(!profile.is_attending("anything"));
    }
}
