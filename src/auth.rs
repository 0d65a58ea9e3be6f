use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::User,
    password::{hash_password, verify_password},
    repository::RepositoryState,
};

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request. Handlers and the nested
/// resource extractors compare this `id` against record owners.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// parse_basic_credentials
///
/// Decodes an `Authorization` header value of the form `Basic base64(user:pass)`.
/// The scheme is matched case-insensitively; the password may itself contain colons.
pub fn parse_basic_credentials(header_value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Well-formed argon2id hash (default parameters) that no password produces.
pub const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$Y0ea1poJCyWCd+yPum+ZQQ$0EuY9I6Pi8wVxq5awFCAHNbc/UKPtfnmXE4W54BzQPo";

/// verify_credentials
///
/// The credential verifier: `Ok(Some(identity))` on a username/password match,
/// `Ok(None)` for an unknown user or a wrong password. Only a store failure is an `Err`.
///
/// argon2 verification is CPU bound, so it runs on the blocking pool.
pub async fn verify_credentials(
    repo: &RepositoryState,
    username: &str,
    password: &str,
) -> Result<Option<AuthUser>, ApiError> {
    let user = repo.find_user_by_username(username).await?;

    // Unknown users are checked against a placeholder hash so both rejections cost the same.
    let password = password.to_string();
    let stored_hash = user
        .as_ref()
        .map_or_else(|| DUMMY_PASSWORD_HASH.to_string(), |u| u.password_hash.clone());
    let matches = tokio::task::spawn_blocking(move || {
        verify_password(&password, &stored_hash)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("password verification task failed: {e}")))?;

    Ok(user.filter(|_| matches).map(|user| AuthUser {
        id: user.id,
        username: user.username,
    }))
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait so `AuthUser` can be taken as a handler
/// argument. The `/api` middleware runs this once and stores the identity in the
/// request extensions; later extractions on the same request reuse it instead of
/// verifying the password again.
///
/// Rejection: `ApiError::Unauthenticated` (401 with a Basic challenge) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let (username, password) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_basic_credentials)
            .ok_or(ApiError::Unauthenticated)?;

        let repo = RepositoryState::from_ref(state);
        match verify_credentials(&repo, &username, &password).await? {
            Some(user) => {
                tracing::debug!(user_id = %user.id, "credentials accepted");
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            None => {
                tracing::info!(username = %username, "credentials rejected");
                Err(ApiError::Unauthenticated)
            }
        }
    }
}

/// provision_user
///
/// Creates `username` with `password` unless it already exists. Returns whether a
/// user was created. Used for the startup seed account and by the test harness.
pub async fn provision_user(
    repo: &RepositoryState,
    username: &str,
    password: &str,
) -> Result<bool, ApiError> {
    if repo.find_user_by_username(username).await?.is_some() {
        return Ok(false);
    }
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))??;
    repo.insert_user(User::new(username, hash)).await?;
    Ok(true)
}
