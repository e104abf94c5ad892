//! Speaker form.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Speaker;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeakerForm {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websafe_key: Option<String>,
}

impl SpeakerForm {
    pub fn from_speaker(speaker: &Speaker) -> Self {
        Self {
            name: speaker.name.clone(),
            email: speaker.email.clone(),
            institution: speaker.institution.clone(),
            creator_user_id: speaker.creator_user_id.clone(),
            websafe_key: Some(speaker.websafe_key()),
        }
    }

    pub fn into_new_speaker(self, creator_user_id: &str) -> AppResult<Speaker> {
        if self.name.is_empty() {
            return Err(AppError::BadRequest(
                "Speaker 'name' field required".to_string(),
            ));
        }

        Ok(Speaker {
            id: Uuid::now_v7(),
            name: self.name,
            email: self.email.filter(|e| !e.is_empty()),
            institution: self.institution.filter(|i| !i.is_empty()),
            creator_user_id: Some(creator_user_id.to_string()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn creator_comes_from_the_caller() {
        let form = SpeakerForm {
            name: "Grace Hopper".to_string(),
            creator_user_id: Some("spoofed@example.com".to_string()),
            ..Default::default()
        };
        let speaker = form.into_new_speaker("ada@example.com").unwrap();
        assert_eq!(speaker.creator_user_id.as_deref(), Some("ada@example.com"));

        let json = serde_json::to_value(SpeakerForm::from_speaker(&speaker)).unwrap();
        assert_eq!(json["creatorUserId"], "ada@example.com");
        assert_eq!(json["websafeKey"], speaker.websafe_key());
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(SpeakerForm::default().into_new_speaker("ada@example.com").is_err());
    }
}
