use crate::{
    AppState,
    auth::AuthUser,
    context::{ListContext, TaskContext},
    error::{ApiError, ApiResult},
    models::{
        CreateListRequest, CreateTaskRequest, ErrorBody, List, RegisterUserRequest, Task,
        UpdateListRequest, UpdateTaskRequest, User, UserProfile, validate_name,
    },
    password::hash_password,
};
use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

// --- List Handlers ---

/// get_lists
///
/// [Authenticated Route] Lists every list owned by the caller, in insertion order.
/// Lists owned by anyone else are never included.
#[utoipa::path(
    get,
    path = "/api/lists",
    responses(
        (status = 200, description = "Caller's lists", body = [List]),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody)
    )
)]
pub async fn get_lists(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<List>>> {
    let lists = state.repo.find_lists_by_owner(id).await?;
    Ok(Json(lists))
}

/// create_list
///
/// [Authenticated Route] Creates a list owned by the caller. The owner always comes
/// from the `AuthUser` extractor; the request type has no owner field to honour.
#[utoipa::path(
    post,
    path = "/api/lists",
    request_body = CreateListRequest,
    responses(
        (status = 201, description = "Created", body = List),
        (status = 400, description = "Missing name", body = ErrorBody)
    )
)]
pub async fn create_list(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateListRequest>,
) -> ApiResult<(StatusCode, Json<List>)> {
    let name = validate_name(payload.name)?;
    let list = state.repo.insert_list(List::new(name, id)).await?;
    tracing::info!(list_id = %list.id, owner = %id, "list created");
    Ok((StatusCode::CREATED, Json(list)))
}

/// get_list
///
/// [Authenticated Route] Returns the list resolved by `ListContext`.
#[utoipa::path(
    get,
    path = "/api/lists/{list_id}",
    params(("list_id" = Uuid, Path, description = "List ID")),
    responses(
        (status = 200, description = "Found", body = List),
        (status = 403, description = "Not Owner", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_list(ctx: ListContext) -> Json<List> {
    Json(ctx.list)
}

/// update_list
///
/// [Authenticated Route] Renames a list. Partial semantics: an absent `name` leaves the
/// list as it was.
#[utoipa::path(
    put,
    path = "/api/lists/{list_id}",
    params(("list_id" = Uuid, Path, description = "List ID")),
    request_body = UpdateListRequest,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Blank name", body = ErrorBody),
        (status = 403, description = "Not Owner", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_list(
    ctx: ListContext,
    State(state): State<AppState>,
    Json(payload): Json<UpdateListRequest>,
) -> ApiResult<StatusCode> {
    let mut list = ctx.list;
    list.apply(payload)?;
    state.repo.save_list(&list).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// delete_list
///
/// [Authenticated Route] Removes a list together with all of its tasks.
#[utoipa::path(
    delete,
    path = "/api/lists/{list_id}",
    params(("list_id" = Uuid, Path, description = "List ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_list(ctx: ListContext, State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.repo.remove_list(ctx.list.id).await?;
    tracing::info!(list_id = %ctx.list.id, name = %ctx.list.name, "list deleted");
    Ok(StatusCode::NO_CONTENT)
}

// --- Task Handlers ---

/// get_tasks
///
/// [Authenticated Route] Lists the tasks contained in the resolved list.
#[utoipa::path(
    get,
    path = "/api/lists/{list_id}/tasks",
    params(("list_id" = Uuid, Path, description = "List ID")),
    responses(
        (status = 200, description = "Tasks of the list", body = [Task]),
        (status = 403, description = "Not Owner", body = ErrorBody),
        (status = 404, description = "List Not Found", body = ErrorBody)
    )
)]
pub async fn get_tasks(ctx: ListContext, State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.repo.find_tasks_by_list(ctx.list.id).await?;
    Ok(Json(tasks))
}

/// create_task
///
/// [Authenticated Route] Adds a task to the resolved list. Both the containing list and
/// the owner come from the context, never from the payload.
#[utoipa::path(
    post,
    path = "/api/lists/{list_id}/tasks",
    params(("list_id" = Uuid, Path, description = "List ID")),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Created", body = Task),
        (status = 400, description = "Missing name", body = ErrorBody),
        (status = 403, description = "Not Owner", body = ErrorBody),
        (status = 404, description = "List Not Found", body = ErrorBody)
    )
)]
pub async fn create_task(
    ctx: ListContext,
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let name = validate_name(payload.name)?;
    let task = state
        .repo
        .insert_task(Task::new(name, &ctx.list, ctx.user.id))
        .await?;
    tracing::info!(task_id = %task.id, list_id = %ctx.list.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// get_task
///
/// [Authenticated Route] Returns a task of the resolved list. A task id that belongs
/// to another list answers 404.
#[utoipa::path(
    get,
    path = "/api/lists/{list_id}/tasks/{task_id}",
    params(
        ("list_id" = Uuid, Path, description = "List ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Found", body = Task),
        (status = 403, description = "List Not Owned", body = ErrorBody),
        (status = 404, description = "Not Found in this list", body = ErrorBody)
    )
)]
pub async fn get_task(ctx: TaskContext) -> Json<Task> {
    Json(ctx.task)
}

/// update_task
///
/// [Authenticated Route] Partial update of `name` and/or `isDone`.
#[utoipa::path(
    put,
    path = "/api/lists/{list_id}/tasks/{task_id}",
    params(
        ("list_id" = Uuid, Path, description = "List ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Blank name", body = ErrorBody),
        (status = 403, description = "List Not Owned", body = ErrorBody),
        (status = 404, description = "Not Found in this list", body = ErrorBody)
    )
)]
pub async fn update_task(
    ctx: TaskContext,
    State(state): State<AppState>,
    Json(payload): Json<UpdateTaskRequest>,
) -> ApiResult<StatusCode> {
    let mut task = ctx.task;
    task.apply(payload)?;
    state.repo.save_task(&task).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// delete_task
///
/// [Authenticated Route] Deletes a task from an owned list.
#[utoipa::path(
    delete,
    path = "/api/lists/{list_id}/tasks/{task_id}",
    params(
        ("list_id" = Uuid, Path, description = "List ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "List Not Owned", body = ErrorBody),
        (status = 404, description = "Not Found in this list", body = ErrorBody)
    )
)]
pub async fn delete_task(ctx: TaskContext, State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.repo.remove_task(ctx.list.id, ctx.task.id).await?;
    tracing::info!(
        task_id = %ctx.task.id,
        list_id = %ctx.list.id,
        name = %ctx.task.name,
        is_done = ctx.task.is_done,
        "task deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

// --- User Handlers ---

/// register_user
///
/// [Public Route] Creates a user that can then authenticate with HTTP Basic. Only the
/// argon2 hash of the password is stored.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = UserProfile),
        (status = 400, description = "Blank username or password", body = ErrorBody),
        (status = 409, description = "Username taken", body = ErrorBody)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let username = payload.username.trim().to_string();
    if username.is_empty() || username.contains(':') {
        return Err(ApiError::Validation("a username without ':' is required".to_string()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::Validation("password is required".to_string()));
    }

    let password = payload.password;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))??;

    let user = state.repo.insert_user(User::new(username, hash)).await?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

/// get_me
///
/// [Authenticated Route] Echoes the identity the credentials resolved to.
#[utoipa::path(
    get,
    path = "/api/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(AuthUser { id, username }: AuthUser) -> Json<UserProfile> {
    Json(UserProfile { id, username })
}
