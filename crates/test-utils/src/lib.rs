//! Conclave test utilities.
//!
//! Helpers for integration testing: bearer token minting and request body
//! fixtures for the JSON API.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::{Value as JsonValue, json};

/// Secret the test application verifies tokens with.
pub const TEST_JWT_SECRET: &str = "conclave-test-secret";

/// Cron key the test application accepts.
pub const TEST_CRON_KEY: &str = "test-cron-key";

/// Issuer expected by the kernel.
const ISSUER: &str = "conclave";

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    sub: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    exp: i64,
}

/// Mint an HS256 identity token for `email`, valid for one hour.
///
/// # Panics
///
/// Panics if encoding fails, which only happens for an unusable key.
pub fn mint_token(secret: &str, email: &str, name: Option<&str>) -> String {
    let claims = Claims {
        iss: ISSUER,
        sub: email,
        email,
        name,
        exp: chrono::Utc::now().timestamp() + 3600,
    };

    #[allow(clippy::expect_used)]
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode test token")
}

/// `Authorization` header value for `email` using [`TEST_JWT_SECRET`].
pub fn bearer(email: &str) -> String {
    format!("Bearer {}", mint_token(TEST_JWT_SECRET, email, None))
}

/// A conference creation body builder.
#[derive(Debug, Clone)]
pub struct TestConference {
    fields: JsonValue,
}

/// Start a conference body with just a name.
pub fn test_conference(name: &str) -> TestConference {
    TestConference {
        fields: json!({ "name": name }),
    }
}

impl TestConference {
    /// Set the capacity.
    pub fn with_max_attendees(mut self, max: i32) -> Self {
        self.fields["maxAttendees"] = json!(max);
        self
    }

    /// Set the city.
    pub fn in_city(mut self, city: &str) -> Self {
        self.fields["city"] = json!(city);
        self
    }

    /// Set the topics.
    pub fn with_topics(mut self, topics: &[&str]) -> Self {
        self.fields["topics"] = json!(topics);
        self
    }

    /// Set the start and end dates (`YYYY-MM-DD`).
    pub fn dated(mut self, start: &str, end: &str) -> Self {
        self.fields["startDate"] = json!(start);
        self.fields["endDate"] = json!(end);
        self
    }

    pub fn build(self) -> JsonValue {
        self.fields
    }
}

/// A session creation body builder.
#[derive(Debug, Clone)]
pub struct TestSession {
    fields: JsonValue,
}

/// Start a session body with just a name.
pub fn test_session(name: &str) -> TestSession {
    TestSession {
        fields: json!({ "name": name }),
    }
}

impl TestSession {
    pub fn by_speaker(mut self, speaker_key: &str) -> Self {
        self.fields["speakerKey"] = json!(speaker_key);
        self
    }

    pub fn of_type(mut self, type_of_session: &str) -> Self {
        self.fields["typeOfSession"] = json!(type_of_session);
        self
    }

    pub fn starting_at(mut self, start_time: &str) -> Self {
        self.fields["startTime"] = json!(start_time);
        self
    }

    pub fn lasting(mut self, minutes: i32) -> Self {
        self.fields["duration"] = json!(minutes);
        self
    }

    pub fn with_highlights(mut self, highlights: &[&str]) -> Self {
        self.fields["highlights"] = json!(highlights);
        self
    }

    pub fn build(self) -> JsonValue {
        self.fields
    }
}

/// A filter triple for query bodies.
pub fn filter(field: &str, operator: &str, value: &str) -> JsonValue {
    json!({ "field": field, "operator": operator, "value": value })
}
