//! Thin authentication edge: password hashing and the bearer-session
//! extractor. Identity and the staff flag are owned here; everything else
//! about a user (role, parent email) lives on the profile.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use thiserror::Error;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::policy::Actor;
use crate::utils::error::AppError;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("could not hash password")]
    Hash,
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::Hash)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

/// Resolves `Authorization: Bearer <token>` into the acting user plus
/// profile. Rejects with 401 when the header is missing or the session is
/// unknown.
pub struct AuthUser(pub Actor);

/// Same resolution, but absence of credentials is not an error; used by
/// pages that render for both visitors and signed-in users.
pub struct MaybeAuthUser(pub Option<Actor>);

fn bearer_token(parts: &Parts) -> Option<Uuid> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| Uuid::parse_str(token.trim()).ok())
}

async fn resolve_actor(state: &AppState, token: Uuid) -> Result<Option<Actor>, AppError> {
    let Some(user) = state.store.session_user(token).await? else {
        return Ok(None);
    };
    let profile = state.store.profile_for_user(user.id).await?;
    Ok(Some(Actor { user, profile }))
}

/// Just the raw bearer token, for operations on the session itself.
pub struct SessionToken(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for SessionToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_token(parts)
            .map(SessionToken)
            .ok_or_else(|| AppError::AuthError("Authentication required".into()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::AuthError("Authentication required".into()))?;
        let actor = resolve_actor(state, token)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid or expired session".into()))?;
        Ok(AuthUser(actor))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor = match bearer_token(parts) {
            Some(token) => resolve_actor(state, token).await?,
            None => None,
        };
        Ok(MaybeAuthUser(actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hashes() {
        assert!(!verify_password("anything", "not a phc string"));
    }
}
