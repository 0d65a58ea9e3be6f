use serde_json::json;
use todo_api::{
    ApiError,
    models::{
        CreateListRequest, List, Task, UpdateListRequest, UpdateTaskRequest, User, UserProfile,
        validate_name,
    },
};
use uuid::Uuid;

#[test]
fn test_task_json_uses_camel_case() {
    let list = List::new("L".to_string(), Uuid::new_v4());
    let task = Task::new("T".to_string(), &list, list.owner);
    let value = serde_json::to_value(&task).unwrap();

    assert_eq!(value["isDone"], false);
    assert_eq!(value["listId"], json!(list.id));
    assert!(value.get("createdOn").is_some());
    assert!(value.get("is_done").is_none());
}

#[test]
fn test_create_request_drops_owner_field() {
    // An owner in the payload has nowhere to land.
    let req: CreateListRequest =
        serde_json::from_value(json!({ "name": "Mine", "owner": Uuid::new_v4() })).unwrap();
    assert_eq!(req.name.as_deref(), Some("Mine"));
}

#[test]
fn test_update_task_request_reads_is_done() {
    let req: UpdateTaskRequest = serde_json::from_value(json!({ "isDone": true })).unwrap();
    assert_eq!(req.is_done, Some(true));
    assert!(req.name.is_none());
}

#[test]
fn test_validate_name() {
    assert_eq!(validate_name(Some("ok".to_string())).unwrap(), "ok");
    assert!(matches!(validate_name(None), Err(ApiError::Validation(_))));
    assert!(matches!(
        validate_name(Some(" \t".to_string())),
        Err(ApiError::Validation(_))
    ));
}

#[test]
fn test_list_apply_never_touches_owner() {
    let owner = Uuid::new_v4();
    let mut list = List::new("Before".to_string(), owner);
    list.apply(UpdateListRequest {
        name: Some("After".to_string()),
    })
    .unwrap();

    assert_eq!(list.name, "After");
    assert_eq!(list.owner, owner);
}

#[test]
fn test_list_apply_rejects_blank_name_and_keeps_state() {
    let mut list = List::new("Before".to_string(), Uuid::new_v4());
    let result = list.apply(UpdateListRequest {
        name: Some(String::new()),
    });
    assert!(result.is_err());
    assert_eq!(list.name, "Before");
}

#[test]
fn test_task_apply_partial() {
    let list = List::new("L".to_string(), Uuid::new_v4());
    let mut task = Task::new("T".to_string(), &list, list.owner);

    task.apply(UpdateTaskRequest {
        name: None,
        is_done: Some(true),
    })
    .unwrap();
    assert_eq!(task.name, "T");
    assert!(task.is_done);

    task.apply(UpdateTaskRequest {
        name: Some("Renamed".to_string()),
        is_done: None,
    })
    .unwrap();
    assert_eq!(task.name, "Renamed");
    assert!(task.is_done);
}

#[test]
fn test_user_profile_hides_password_hash() {
    let user = User::new("foo", "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA");
    let value = serde_json::to_value(UserProfile::from(&user)).unwrap();

    assert_eq!(value["username"], "foo");
    assert_eq!(value.as_object().unwrap().len(), 2);
}
