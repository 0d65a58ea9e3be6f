use axum::{
    extract::FromRequestParts,
    http::{Request, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::sync::Arc;
use todo_api::{
    AppConfig, AppState, ApiError, InMemoryRepository,
    auth::{AuthUser, DUMMY_PASSWORD_HASH, parse_basic_credentials, provision_user, verify_credentials},
    password::{hash_password, verify_password},
    repository::RepositoryState,
};

fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
}

async fn state_with_user(username: &str, password: &str) -> AppState {
    let repo: RepositoryState = Arc::new(InMemoryRepository::new());
    assert!(provision_user(&repo, username, password).await.unwrap());
    AppState::new(repo, AppConfig::default())
}

async fn extract(state: &AppState, authorization: Option<&str>) -> Result<AuthUser, ApiError> {
    let mut builder = Request::builder().uri("/api/lists");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let (mut parts, _) = builder.body(()).unwrap().into_parts();
    AuthUser::from_request_parts(&mut parts, state).await
}

// --- Header parsing ---

#[test]
fn test_parse_basic_credentials() {
    assert_eq!(
        parse_basic_credentials(&basic("foo", "bar")),
        Some(("foo".to_string(), "bar".to_string()))
    );
    // The password keeps everything after the first colon.
    assert_eq!(
        parse_basic_credentials(&basic("foo", "b:a:r")),
        Some(("foo".to_string(), "b:a:r".to_string()))
    );
    // Scheme is case-insensitive.
    let lower = basic("foo", "bar").replacen("Basic", "basic", 1);
    assert!(parse_basic_credentials(&lower).is_some());
}

#[test]
fn test_parse_basic_credentials_rejects_garbage() {
    assert_eq!(parse_basic_credentials("Bearer abc.def.ghi"), None);
    assert_eq!(parse_basic_credentials("Basic !!!not-base64!!!"), None);
    assert_eq!(
        parse_basic_credentials(&format!("Basic {}", STANDARD.encode("no-colon"))),
        None
    );
    assert_eq!(parse_basic_credentials("Basic"), None);
}

// --- Password hashing ---

#[test]
fn test_password_hash_round_trip() {
    let hash = hash_password("bar").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("bar", &hash));
    assert!(!verify_password("baz", &hash));
    assert!(!verify_password("bar", "not-a-phc-string"));
}

// --- Credential verifier ---

#[tokio::test]
async fn test_verify_credentials_outcomes() {
    let state = state_with_user("foo", "bar").await;

    let ok = verify_credentials(&state.repo, "foo", "bar").await.unwrap();
    assert_eq!(ok.unwrap().username, "foo");

    assert!(verify_credentials(&state.repo, "foo", "nope").await.unwrap().is_none());
    assert!(verify_credentials(&state.repo, "ghost", "bar").await.unwrap().is_none());
}

#[test]
fn test_dummy_hash_is_a_real_argon2id_hash() {
    // A parseable hash means unknown users still pay for a full argon2 verification.
    let parsed = argon2::PasswordHash::new(DUMMY_PASSWORD_HASH).unwrap();
    assert_eq!(parsed.algorithm.as_str(), "argon2id");

    let default_cost = hash_password("bar").unwrap();
    let default_cost = argon2::PasswordHash::new(&default_cost).unwrap();
    assert_eq!(parsed.params, default_cost.params);

    for candidate in ["", "bar", "password"] {
        assert!(!verify_password(candidate, DUMMY_PASSWORD_HASH));
    }
}

#[tokio::test]
async fn test_unknown_user_with_placeholder_password_is_rejected() {
    let state = state_with_user("foo", "bar").await;
    for password in ["", "bar", DUMMY_PASSWORD_HASH] {
        assert!(verify_credentials(&state.repo, "ghost", password).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn test_provision_user_is_idempotent() {
    let state = state_with_user("foo", "bar").await;
    assert!(!provision_user(&state.repo, "foo", "changed").await.unwrap());
    // The original password still works.
    assert!(verify_credentials(&state.repo, "foo", "bar").await.unwrap().is_some());
}

// --- Extractor ---

#[tokio::test]
async fn test_extractor_accepts_valid_credentials() {
    let state = state_with_user("foo", "bar").await;
    let user = extract(&state, Some(&basic("foo", "bar"))).await.unwrap();
    assert_eq!(user.username, "foo");
}

#[tokio::test]
async fn test_extractor_rejects_missing_or_bad_credentials() {
    let state = state_with_user("foo", "bar").await;

    for header_value in [
        None,
        Some("Bearer token".to_string()),
        Some(basic("foo", "wrong")),
        Some(basic("nobody", "bar")),
    ] {
        let result = extract(&state, header_value.as_deref()).await;
        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }
}

#[tokio::test]
async fn test_extractor_reuses_identity_from_extensions() {
    let state = AppState::new(
        Arc::new(InMemoryRepository::new_failing()),
        AppConfig::default(),
    );
    let identity = AuthUser {
        id: uuid::Uuid::new_v4(),
        username: "cached".to_string(),
    };

    let (mut parts, _) = Request::builder()
        .uri("/api/lists")
        .body(())
        .unwrap()
        .into_parts();
    parts.extensions.insert(identity.clone());

    // The failing store is never consulted.
    let user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(user, identity);
}

#[tokio::test]
async fn test_extractor_store_failure_is_not_unauthenticated() {
    let state = AppState::new(
        Arc::new(InMemoryRepository::new_failing()),
        AppConfig::default(),
    );
    let result = extract(&state, Some(&basic("foo", "bar"))).await;
    assert!(matches!(result, Err(ApiError::Store(_))));
}
