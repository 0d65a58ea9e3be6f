use std::collections::HashMap;

use axum::{
    extract::{FromRef, FromRequestParts, Path},
    http::request::Parts,
};

use crate::{
    auth::AuthUser,
    error::ApiError,
    models::{List, Task},
    ownership::{self, Resolution},
    repository::RepositoryState,
};

/// Path segment names used by the nested routes.
pub const LIST_ID: &str = "list_id";
pub const TASK_ID: &str = "task_id";

/// ListContext
///
/// The per-request context of every `/api/lists/{list_id}/...` route: the
/// authenticated caller and the list they own. It is built once per request before the
/// handler body runs; a 403 or 404 from the list stage short-circuits the request.
#[derive(Debug, Clone)]
pub struct ListContext {
    pub user: AuthUser,
    pub list: List,
}

/// TaskContext
///
/// The list context extended with a task found inside that list. Only containment is
/// checked at this stage.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub user: AuthUser,
    pub list: List,
    pub task: Task,
}

impl ListContext {
    /// resolve
    ///
    /// Parent stage of the nested resource pipeline.
    pub async fn resolve(
        repo: &RepositoryState,
        user: AuthUser,
        raw_list_id: &str,
    ) -> Result<Self, ApiError> {
        let resolution = ownership::resolve_list(repo.as_ref(), raw_list_id, user.id).await?;
        log_outcome("list", raw_list_id, &resolution);
        let list = resolution.into_result()?;
        Ok(Self { user, list })
    }
}

impl TaskContext {
    /// resolve
    ///
    /// Child stage: only ever entered with a fully resolved list.
    pub async fn resolve(
        repo: &RepositoryState,
        parent: ListContext,
        raw_task_id: &str,
    ) -> Result<Self, ApiError> {
        let resolution =
            ownership::resolve_task_in_list(repo.as_ref(), &parent.list, raw_task_id).await?;
        log_outcome("task", raw_task_id, &resolution);
        let task = resolution.into_result()?;
        Ok(Self {
            user: parent.user,
            list: parent.list,
            task,
        })
    }
}

fn log_outcome<T>(kind: &'static str, raw_id: &str, resolution: &Resolution<T>) {
    let outcome = match resolution {
        Resolution::Found(_) => "found",
        Resolution::Forbidden => "forbidden",
        Resolution::NotFound => "not_found",
    };
    tracing::debug!(resource = kind, id = %raw_id, outcome, "resolved nested resource");
}

async fn path_segment<S>(parts: &mut Parts, state: &S, name: &str) -> Result<String, ApiError>
where
    S: Send + Sync,
{
    let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map_err(|_| ApiError::NotFound)?;
    params.get(name).cloned().ok_or(ApiError::NotFound)
}

impl<S> FromRequestParts<S> for ListContext
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let raw_list_id = path_segment(parts, state, LIST_ID).await?;
        let repo = RepositoryState::from_ref(state);
        ListContext::resolve(&repo, user, &raw_list_id).await
    }
}

impl<S> FromRequestParts<S> for TaskContext
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let parent = ListContext::from_request_parts(parts, state).await?;
        let raw_task_id = path_segment(parts, state, TASK_ID).await?;
        let repo = RepositoryState::from_ref(state);
        TaskContext::resolve(&repo, parent, &raw_task_id).await
    }
}
