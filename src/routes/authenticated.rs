use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// The `/api` surface (mounted under `/api` by `create_router`).
///
/// Access Control Strategy:
/// The whole router is wrapped in the authentication middleware, so every handler runs
/// with a verified `AuthUser`. Routes carrying `{list_id}` then resolve the list through
/// `ListContext` (owner check: 403/404), and routes carrying `{task_id}` additionally
/// resolve the task inside that list through `TaskContext` (containment check: 404).
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/me
        .route("/me", get(handlers::get_me))
        // GET/POST /api/lists
        // Listing is filtered by owner; creation forces the owner to the caller.
        .route("/lists", get(handlers::get_lists).post(handlers::create_list))
        // GET/PUT/DELETE /api/lists/{list_id}
        .route(
            "/lists/{list_id}",
            get(handlers::get_list)
                .put(handlers::update_list)
                .delete(handlers::delete_list),
        )
        // GET/POST /api/lists/{list_id}/tasks
        .route(
            "/lists/{list_id}/tasks",
            get(handlers::get_tasks).post(handlers::create_task),
        )
        // GET/PUT/DELETE /api/lists/{list_id}/tasks/{task_id}
        .route(
            "/lists/{list_id}/tasks/{task_id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
}
