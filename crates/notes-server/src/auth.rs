//! Authentication module: session tokens, password hashing, and the
//! request extractors that resolve the current user.
//!
//! The session is an HS256 JWT stored in the `sessionid` cookie. A token that
//! fails validation, or names a missing or deactivated user, counts as no
//! session at all.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use notes_core::{Actor, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sessionid";

/// JWT claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID (subject).
    pub sub: Uuid,
    /// Username at login time.
    pub username: String,
    /// Expiration time (unix timestamp).
    pub exp: usize,
    /// Issued at (unix timestamp).
    pub iat: usize,
}

/// Logged-in user resolved from the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub username: String,
}

impl CurrentUser {
    pub fn actor(&self) -> Actor {
        Actor::User(self.user_id)
    }
}

/// The current user, if any. Never rejects for a missing session.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    pub fn actor(&self) -> Actor {
        Actor::from(self.0.as_ref().map(|u| u.user_id))
    }
}

/// Create a session token for a user.
pub fn create_token(
    user_id: UserId,
    username: &str,
    secret: &str,
    expiry_hours: u64,
) -> Result<String, ApiError> {
    let now = chrono::Utc::now();
    let expires_at = i64::try_from(expiry_hours)
        .ok()
        .and_then(chrono::TimeDelta::try_hours)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| {
            ApiError::Internal(format!("session lifetime of {expiry_hours} hours is out of range"))
        })?;
    let exp = expires_at.timestamp() as usize;

    let claims = Claims {
        sub: *user_id.as_uuid(),
        username: username.to_string(),
        exp,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("Failed to create token: {}", e)))
}

/// Validate a session token and return its claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(password_hash.to_string())
}

/// Verify a password against a hash.
///
/// An unparsable hash (such as the `!` placeholder of an account without a
/// usable password) never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Session cookie carrying `token`. Expiry is enforced by the token itself.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie that clears the session.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Resolve the session in `parts` to an active user.
async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>, ApiError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let claims = match validate_token(cookie.value(), &state.config().session_secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session token");
            return Ok(None);
        }
    };

    let user_id = UserId::from_uuid(claims.sub);
    match state.store().get_user_by_id(user_id).await {
        Ok(user) if user.is_active => Ok(Some(CurrentUser {
            user_id,
            username: user.username,
        })),
        Ok(_) => Ok(None),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = resolve_user(parts, state).await? {
            return Ok(user);
        }

        let next = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| parts.uri.path());
        tracing::debug!(next = %next, "Anonymous request to a protected page");

        Err(ApiError::Unauthenticated {
            location: state.urls().login_redirect(next),
        })
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state).await.map(MaybeUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let password = "test_password_123";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash));
        assert!(!verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_placeholder_hash_never_verifies() {
        assert!(!verify_password("", "!"));
        assert!(!verify_password("!", "!"));
    }

    #[test]
    fn test_create_and_validate_token() {
        let secret = "test_secret_key_12345";
        let user_id = UserId::new();

        let token = create_token(user_id, "Автор", secret, 24).unwrap();
        let claims = validate_token(&token, secret).unwrap();

        assert_eq!(claims.sub, *user_id.as_uuid());
        assert_eq!(claims.username, "Автор");
    }

    #[test]
    fn test_create_token_rejects_unrepresentable_lifetime() {
        let user_id = UserId::new();

        for hours in [1_000_000_000_000_000, u64::MAX] {
            let result = create_token(user_id, "Автор", "secret", hours);
            assert!(matches!(result, Err(ApiError::Internal(_))), "{hours}");
        }
    }

    #[test]
    fn test_validate_token_wrong_secret() {
        let token = create_token(UserId::new(), "user", "secret1", 24).unwrap();
        assert!(validate_token(&token, "secret2").is_err());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_actor_from_maybe_user() {
        assert_eq!(MaybeUser(None).actor(), Actor::Anonymous);
        let user = CurrentUser {
            user_id: UserId::new(),
            username: "u".into(),
        };
        assert_eq!(MaybeUser(Some(user.clone())).actor(), user.actor());
    }
}
