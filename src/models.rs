use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The stored identity record used by the credential verifier. Users are created
/// independently of lists (registration or startup seeding) and are never serialized
/// directly; `UserProfile` is the outward-facing view.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    // Unique login name, matched exactly against the Basic credentials.
    pub username: String,
    // argon2 PHC string. Never leaves the server.
    pub password_hash: String,
    pub created_on: DateTime<Utc>,
}

impl User {
    /// Builds a fresh user record around an already computed password hash.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_on: Utc::now(),
        }
    }
}

/// List
///
/// A named to-do list. `owner` is written once at creation from the authenticated
/// identity and is never reassigned by any update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct List {
    pub id: Uuid,
    pub name: String,
    // FK to users.id.
    pub owner: Uuid,
    #[ts(type = "string")]
    pub created_on: DateTime<Utc>,
}

impl List {
    pub fn new(name: String, owner: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            owner,
            created_on: Utc::now(),
        }
    }

    /// Applies a partial update. Only `name` is recognised; the owner is untouchable.
    pub fn apply(&mut self, patch: UpdateListRequest) -> Result<(), ApiError> {
        if let Some(name) = patch.name {
            self.name = validate_name(Some(name))?;
        }
        Ok(())
    }
}

/// Task
///
/// A detached task record. Containment is expressed through `list_id`; nested routes
/// always look tasks up by the `(list_id, id)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Task {
    pub id: Uuid,
    // FK to lists.id (the containing list).
    pub list_id: Uuid,
    // Copied from the creator's identity, which always equals the list owner.
    pub owner: Uuid,
    pub name: String,
    pub is_done: bool,
    #[ts(type = "string")]
    pub created_on: DateTime<Utc>,
}

impl Task {
    pub fn new(name: String, list: &List, owner: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            list_id: list.id,
            owner,
            name,
            is_done: false,
            created_on: Utc::now(),
        }
    }

    /// Partial update over `name` and `isDone`. An explicit `false` is applied.
    pub fn apply(&mut self, patch: UpdateTaskRequest) -> Result<(), ApiError> {
        if let Some(name) = patch.name {
            self.name = validate_name(Some(name))?;
        }
        if let Some(is_done) = patch.is_done {
            self.is_done = is_done;
        }
        Ok(())
    }
}

// --- API Request/Response DTOs ---

/// CreateListRequest
///
/// Body of `POST /api/lists`. Any `owner` supplied by the client is not part of this
/// type and is dropped during deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateListRequest {
    pub name: Option<String>,
}

/// UpdateListRequest
///
/// Body of `PUT /api/lists/{list_id}`. Absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateListRequest {
    pub name: Option<String>,
}

/// CreateTaskRequest
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateTaskRequest {
    pub name: Option<String>,
}

/// UpdateTaskRequest
///
/// Body of `PUT /api/lists/{list_id}/tasks/{task_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateTaskRequest {
    pub name: Option<String>,
    pub is_done: Option<bool>,
}

/// RegisterUserRequest
///
/// Payload for the public `/register` route.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password: String,
}

/// UserProfile
///
/// Public view of a user: never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// ErrorBody
///
/// The minimal JSON body attached to every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

/// validate_name
///
/// `name` is required on lists and tasks: missing or blank values are rejected before
/// anything reaches the store.
pub fn validate_name(name: Option<String>) -> Result<String, ApiError> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(ApiError::Validation("name is required".to_string())),
    }
}
