//! Profile forms.

use serde::{Deserialize, Serialize};

use crate::models::{Profile, TeeShirtSize};
use crate::services::profile::ProfileUpdate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub display_name: Option<String>,
    pub main_email: Option<String>,
    pub tee_shirt_size: TeeShirtSize,
    pub conference_keys_to_attend: Vec<String>,
    pub sessions_wishlist: Vec<String>,
}

impl From<&Profile> for ProfileForm {
    fn from(profile: &Profile) -> Self {
        Self {
            display_name: profile.display_name.clone(),
            main_email: profile.main_email.clone(),
            tee_shirt_size: profile.tee_shirt_size,
            conference_keys_to_attend: profile.conference_keys_to_attend.clone(),
            sessions_wishlist: profile.sessions_wishlist.clone(),
        }
    }
}

/// The user-editable subset of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileMiniForm {
    pub display_name: Option<String>,
    pub tee_shirt_size: Option<TeeShirtSize>,
}

impl From<ProfileMiniForm> for ProfileUpdate {
    fn from(form: ProfileMiniForm) -> Self {
        Self {
            display_name: form.display_name,
            tee_shirt_size: form.tee_shirt_size,
        }
    }
}
