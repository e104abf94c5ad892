//! Bearer token authentication.
//!
//! Identity comes from an HS256 JWT issued by the identity provider. The
//! middleware verifies a presented token and stores the caller in request
//! extensions; handlers that need a caller take [`AuthUser`] as an
//! extractor, which rejects anonymous requests with 401.

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Expected `iss` claim.
pub const ISSUER: &str = "conclave";

/// Claims carried by an identity token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer.
    pub iss: String,
    /// Subject as assigned by the identity provider.
    pub sub: String,
    /// Verified email address; the caller's user id.
    pub email: String,
    /// Display nickname, if the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Verifies identity tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret),
        }
    }

    /// Verify signature, issuer and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_aud = false;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .context("invalid token")?;

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish()
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Stable user id; the caller's email.
    pub user_id: String,
    pub email: String,
    pub nickname: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        let nickname = claims.name.unwrap_or_else(|| {
            claims
                .email
                .split('@')
                .next()
                .unwrap_or(&claims.email)
                .to_string()
        });

        Self {
            user_id: claims.email.clone(),
            email: claims.email,
            nickname,
        }
    }
}

/// Middleware to authenticate Bearer JWT tokens.
///
/// If a valid Bearer token is present, sets the caller in request
/// extensions. If no token is present, passes through without modification.
/// If an invalid token is present, returns 401.
pub async fn authenticate_bearer_token(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let Some(token) = auth_header.and_then(|h| h.strip_prefix("Bearer ")) else {
        return next.run(request).await;
    };

    let claims = match state.token_verifier().verify(token) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "invalid bearer token");
            return AppError::Unauthorized("Invalid token".to_string()).into_response();
        }
    };

    request.extensions_mut().insert(AuthUser::from(claims));

    next.run(request).await
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(AppError::authorization_required)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};

    const SECRET: &[u8] = b"test-secret";

    fn token(iss: &str, exp_offset: i64, name: Option<&str>) -> String {
        let claims = Claims {
            iss: iss.to_string(),
            sub: "1234".to_string(),
            email: "ada@example.com".to_string(),
            name: name.map(str::to_string),
            exp: chrono::Utc::now().timestamp() + exp_offset,
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_email_as_user_id() {
        let claims = TokenVerifier::new(SECRET)
            .verify(&token(ISSUER, 3600, Some("Ada L.")))
            .unwrap();
        let user = AuthUser::from(claims);

        assert_eq!(user.user_id, "ada@example.com");
        assert_eq!(user.nickname, "Ada L.");
    }

    #[test]
    fn nickname_defaults_to_email_local_part() {
        let claims = TokenVerifier::new(SECRET)
            .verify(&token(ISSUER, 3600, None))
            .unwrap();
        assert_eq!(AuthUser::from(claims).nickname, "ada");
    }

    #[test]
    fn expired_token_is_rejected() {
        let result = TokenVerifier::new(SECRET).verify(&token(ISSUER, -3600, None));
        assert!(result.is_err());
    }

    #[test]
    fn wrong_issuer_or_secret_is_rejected() {
        assert!(TokenVerifier::new(SECRET).verify(&token("elsewhere", 3600, None)).is_err());
        assert!(TokenVerifier::new(b"other").verify(&token(ISSUER, 3600, None)).is_err());
    }
}
