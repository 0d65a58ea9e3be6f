use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use todo_api::{
    AppConfig, AppState, ApiError, InMemoryRepository,
    auth::AuthUser,
    context::{ListContext, TaskContext},
    handlers,
    models::{
        CreateListRequest, CreateTaskRequest, List, Task, UpdateListRequest, UpdateTaskRequest,
    },
    repository::Repository,
};
use uuid::Uuid;

// --- TEST UTILITIES ---

const OWNER_ID: Uuid = Uuid::from_u128(123);

fn owner() -> AuthUser {
    AuthUser {
        id: OWNER_ID,
        username: "foo".to_string(),
    }
}

// Creates an AppState around the given store.
fn create_test_state(repo: Arc<InMemoryRepository>) -> AppState {
    AppState::new(repo, AppConfig::default())
}

async fn seeded() -> (Arc<InMemoryRepository>, List, Task) {
    let repo = Arc::new(InMemoryRepository::new());
    let list = repo
        .insert_list(List::new("My list".to_string(), OWNER_ID))
        .await
        .unwrap();
    let task = repo
        .insert_task(Task::new("My task".to_string(), &list, OWNER_ID))
        .await
        .unwrap();
    (repo, list, task)
}

// --- HANDLER TESTS ---

#[tokio::test]
async fn test_create_list_forces_owner_and_returns_created() {
    let repo = Arc::new(InMemoryRepository::new());
    let state = create_test_state(repo.clone());

    let (status, Json(list)) = handlers::create_list(
        owner(),
        State(state),
        Json(CreateListRequest {
            name: Some("Chores".to_string()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(list.owner, OWNER_ID);
    assert_eq!(repo.find_lists_by_owner(OWNER_ID).await.unwrap(), vec![list]);
}

#[tokio::test]
async fn test_create_list_blank_name_is_validation_failure() {
    let repo = Arc::new(InMemoryRepository::new());
    let result = handlers::create_list(
        owner(),
        State(create_test_state(repo.clone())),
        Json(CreateListRequest {
            name: Some("   ".to_string()),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::Validation(_))));
    assert!(repo.find_lists_by_owner(OWNER_ID).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_lists_preserves_insertion_order() {
    let repo = Arc::new(InMemoryRepository::new());
    for name in ["first", "second", "third"] {
        repo.insert_list(List::new(name.to_string(), OWNER_ID))
            .await
            .unwrap();
    }
    repo.insert_list(List::new("someone else's".to_string(), Uuid::new_v4()))
        .await
        .unwrap();

    let Json(lists) = handlers::get_lists(owner(), State(create_test_state(repo)))
        .await
        .unwrap();
    let names: Vec<_> = lists.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["first", "second", "third"]);
}

#[tokio::test]
async fn test_update_list_without_name_keeps_name() {
    let (repo, list, _) = seeded().await;
    let ctx = ListContext {
        user: owner(),
        list: list.clone(),
    };

    let status = handlers::update_list(
        ctx,
        State(create_test_state(repo.clone())),
        Json(UpdateListRequest::default()),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::NO_CONTENT);
    let stored = repo.find_list_by_id(list.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "My list");
}

#[tokio::test]
async fn test_update_task_explicit_false_is_applied() {
    let (repo, list, mut task) = seeded().await;
    task.is_done = true;
    repo.save_task(&task).await.unwrap();

    let ctx = TaskContext {
        user: owner(),
        list: list.clone(),
        task: task.clone(),
    };
    handlers::update_task(
        ctx,
        State(create_test_state(repo.clone())),
        Json(UpdateTaskRequest {
            name: None,
            is_done: Some(false),
        }),
    )
    .await
    .unwrap();

    let stored = repo.find_task_in_list(list.id, task.id).await.unwrap().unwrap();
    assert!(!stored.is_done);
    assert_eq!(stored.name, "My task");
}

#[tokio::test]
async fn test_create_task_takes_list_and_owner_from_context() {
    let (repo, list, _) = seeded().await;
    let ctx = ListContext {
        user: owner(),
        list: list.clone(),
    };

    let (status, Json(task)) = handlers::create_task(
        ctx,
        State(create_test_state(repo.clone())),
        Json(CreateTaskRequest {
            name: Some("Second".to_string()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task.list_id, list.id);
    assert_eq!(task.owner, OWNER_ID);
    assert!(!task.is_done);
    assert_eq!(repo.find_tasks_by_list(list.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_task_removes_only_that_task() {
    let (repo, list, task) = seeded().await;
    let other = repo
        .insert_task(Task::new("keep".to_string(), &list, OWNER_ID))
        .await
        .unwrap();

    let ctx = TaskContext {
        user: owner(),
        list: list.clone(),
        task: task.clone(),
    };
    let status = handlers::delete_task(ctx, State(create_test_state(repo.clone())))
        .await
        .unwrap();

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(repo.find_tasks_by_list(list.id).await.unwrap(), vec![other]);
}

#[tokio::test]
async fn test_store_failure_is_internal_error_without_detail() {
    let repo = Arc::new(InMemoryRepository::new_failing());
    let result = handlers::get_lists(owner(), State(create_test_state(repo))).await;

    let err = result.unwrap_err();
    assert!(matches!(err, ApiError::Store(_)));

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn test_get_me_echoes_identity() {
    let Json(profile) = handlers::get_me(owner()).await;
    assert_eq!(profile.id, OWNER_ID);
    assert_eq!(profile.username, "foo");
}
