//! Ownership resolution.
//!
//! Every lookup performed on behalf of a requester ends in exactly one of three
//! outcomes. Absence and ownership mismatch are kept apart because they answer with
//! different status codes (404 vs 403).

use uuid::Uuid;

use crate::{
    error::{ApiError, StoreError},
    models::{List, Task},
    repository::Repository,
};

/// A record with a single owning user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for List {
    fn owner_id(&self) -> Uuid {
        self.owner
    }
}

/// Resolution
///
/// Outcome of one lookup stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// The record exists and the requester may act on it.
    Found(T),
    /// The record exists but belongs to someone else.
    Forbidden,
    /// No such record (or, for contained lookups, not inside the given parent).
    NotFound,
}

impl<T> Resolution<T> {
    /// Converts the outcome into the handler pipeline's short-circuiting form.
    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            Resolution::Found(record) => Ok(record),
            Resolution::Forbidden => Err(ApiError::Forbidden),
            Resolution::NotFound => Err(ApiError::NotFound),
        }
    }
}

/// classify
///
/// The pure three-way decision over an already loaded record.
pub fn classify<T: Owned>(record: Option<T>, expected_owner: Uuid) -> Resolution<T> {
    match record {
        None => Resolution::NotFound,
        Some(record) if record.owner_id() != expected_owner => Resolution::Forbidden,
        Some(record) => Resolution::Found(record),
    }
}

/// Parses a path identifier. Anything that is not a UUID cannot name a record.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// resolve_list
///
/// Loads a list by its raw path identifier and classifies it against the requester.
pub async fn resolve_list(
    repo: &dyn Repository,
    raw_list_id: &str,
    requester: Uuid,
) -> Result<Resolution<List>, StoreError> {
    let Some(list_id) = parse_id(raw_list_id) else {
        return Ok(Resolution::NotFound);
    };
    let list = repo.find_list_by_id(list_id).await?;
    Ok(classify(list, requester))
}

/// resolve_task_in_list
///
/// Looks a task up strictly inside an already resolved list. A task that exists under
/// another list is reported as `NotFound`, never `Forbidden`; this stage does not
/// produce `Forbidden` at all, ownership having been settled on the list.
pub async fn resolve_task_in_list(
    repo: &dyn Repository,
    list: &List,
    raw_task_id: &str,
) -> Result<Resolution<Task>, StoreError> {
    let Some(task_id) = parse_id(raw_task_id) else {
        return Ok(Resolution::NotFound);
    };
    Ok(match repo.find_task_in_list(list.id, task_id).await? {
        Some(task) => Resolution::Found(task),
        None => Resolution::NotFound,
    })
}
