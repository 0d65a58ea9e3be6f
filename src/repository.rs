use crate::error::StoreError;
use crate::models::{List, Task, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository Trait
///
/// The persistence contract consumed by the credential verifier, the ownership
/// resolver and the collection handlers. Lookups return `Ok(None)` for absence; `Err`
/// is reserved for genuine store failures, which end the request with a 500.
///
/// **Send + Sync + async_trait** are required so the trait object (`Arc<dyn Repository>`)
/// can be shared across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    // Fails with `DuplicateUsername` if the name is taken.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;

    // --- Lists ---
    async fn find_list_by_id(&self, id: Uuid) -> Result<Option<List>, StoreError>;
    // Insertion ordered.
    async fn find_lists_by_owner(&self, owner: Uuid) -> Result<Vec<List>, StoreError>;
    async fn insert_list(&self, list: List) -> Result<List, StoreError>;
    // Whole-record save: the last write wins.
    async fn save_list(&self, list: &List) -> Result<(), StoreError>;
    // Removes the list and every task it contains.
    async fn remove_list(&self, id: Uuid) -> Result<(), StoreError>;

    // --- Tasks ---
    // Compound-key lookup: a task under a different list is simply absent.
    async fn find_task_in_list(
        &self,
        list_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<Task>, StoreError>;
    async fn find_tasks_by_list(&self, list_id: Uuid) -> Result<Vec<Task>, StoreError>;
    async fn insert_task(&self, task: Task) -> Result<Task, StoreError>;
    async fn save_task(&self, task: &Task) -> Result<(), StoreError>;
    async fn remove_task(&self, list_id: Uuid, task_id: Uuid) -> Result<(), StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The production implementation of the `Repository` trait, backed by PostgreSQL.
/// Queries are checked at runtime so the crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_on FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    /// insert_user
    ///
    /// Relies on the `UNIQUE (username)` constraint rather than a check-then-insert, so
    /// two concurrent registrations cannot both win.
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, username, password_hash, created_on)
               VALUES ($1, $2, $3, $4)
               RETURNING id, username, password_hash, created_on"#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_on)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate =
                matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
            if duplicate {
                StoreError::DuplicateUsername
            } else {
                StoreError::from_sqlx(e)
            }
        })
    }

    async fn find_list_by_id(&self, id: Uuid) -> Result<Option<List>, StoreError> {
        sqlx::query_as::<_, List>("SELECT id, name, owner, created_on FROM lists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn find_lists_by_owner(&self, owner: Uuid) -> Result<Vec<List>, StoreError> {
        sqlx::query_as::<_, List>(
            "SELECT id, name, owner, created_on FROM lists WHERE owner = $1 ORDER BY created_on ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn insert_list(&self, list: List) -> Result<List, StoreError> {
        sqlx::query_as::<_, List>(
            r#"INSERT INTO lists (id, name, owner, created_on)
               VALUES ($1, $2, $3, $4)
               RETURNING id, name, owner, created_on"#,
        )
        .bind(list.id)
        .bind(&list.name)
        .bind(list.owner)
        .bind(list.created_on)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    /// save_list
    ///
    /// Persists the mutable fields only. `owner` and `created_on` are never part of the
    /// UPDATE, so no code path can reassign ownership.
    async fn save_list(&self, list: &List) -> Result<(), StoreError> {
        sqlx::query("UPDATE lists SET name = $2 WHERE id = $1")
            .bind(list.id)
            .bind(&list.name)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    async fn remove_list(&self, id: Uuid) -> Result<(), StoreError> {
        // tasks.list_id is ON DELETE CASCADE.
        sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    async fn find_task_in_list(
        &self,
        list_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<Task>, StoreError> {
        sqlx::query_as::<_, Task>(
            r#"SELECT id, list_id, owner, name, is_done, created_on
               FROM tasks
               WHERE id = $1 AND list_id = $2"#,
        )
        .bind(task_id)
        .bind(list_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn find_tasks_by_list(&self, list_id: Uuid) -> Result<Vec<Task>, StoreError> {
        sqlx::query_as::<_, Task>(
            r#"SELECT id, list_id, owner, name, is_done, created_on
               FROM tasks
               WHERE list_id = $1
               ORDER BY created_on ASC"#,
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn insert_task(&self, task: Task) -> Result<Task, StoreError> {
        sqlx::query_as::<_, Task>(
            r#"INSERT INTO tasks (id, list_id, owner, name, is_done, created_on)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, list_id, owner, name, is_done, created_on"#,
        )
        .bind(task.id)
        .bind(task.list_id)
        .bind(task.owner)
        .bind(&task.name)
        .bind(task.is_done)
        .bind(task.created_on)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        sqlx::query("UPDATE tasks SET name = $3, is_done = $4 WHERE id = $1 AND list_id = $2")
            .bind(task.id)
            .bind(task.list_id)
            .bind(&task.name)
            .bind(task.is_done)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    async fn remove_task(&self, list_id: Uuid, task_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM tasks WHERE id = $1 AND list_id = $2")
            .bind(task_id)
            .bind(list_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }
}

// --- In-Memory Implementation (Local runs without DATABASE_URL, and Tests) ---

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    lists: Vec<List>,
    tasks: Vec<Task>,
}

/// InMemoryRepository
///
/// A process-local store with the same observable semantics as `PostgresRepository`:
/// insertion ordered listings, compound-key task lookups and cascading list removal.
/// Vectors keep insertion order, which is all the ordering the API promises.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
    /// When true, every operation fails with `StoreError::Unavailable`.
    pub should_fail: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.should_fail {
            return Err(StoreError::Unavailable(
                "in-memory store configured to fail".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::DuplicateUsername);
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_list_by_id(&self, id: Uuid) -> Result<Option<List>, StoreError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.lists.iter().find(|l| l.id == id).cloned())
    }

    async fn find_lists_by_owner(&self, owner: Uuid) -> Result<Vec<List>, StoreError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .lists
            .iter()
            .filter(|l| l.owner == owner)
            .cloned()
            .collect())
    }

    async fn insert_list(&self, list: List) -> Result<List, StoreError> {
        self.check()?;
        if list.name.trim().is_empty() {
            return Err(StoreError::Constraint("lists.name must not be empty".to_string()));
        }
        self.tables.write().await.lists.push(list.clone());
        Ok(list)
    }

    async fn save_list(&self, list: &List) -> Result<(), StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables.lists.iter_mut().find(|l| l.id == list.id) {
            stored.name = list.name.clone();
        }
        Ok(())
    }

    async fn remove_list(&self, id: Uuid) -> Result<(), StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        tables.lists.retain(|l| l.id != id);
        tables.tasks.retain(|t| t.list_id != id);
        Ok(())
    }

    async fn find_task_in_list(
        &self,
        list_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<Task>, StoreError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .find(|t| t.id == task_id && t.list_id == list_id)
            .cloned())
    }

    async fn find_tasks_by_list(&self, list_id: Uuid) -> Result<Vec<Task>, StoreError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| t.list_id == list_id)
            .cloned()
            .collect())
    }

    async fn insert_task(&self, task: Task) -> Result<Task, StoreError> {
        self.check()?;
        if task.name.trim().is_empty() {
            return Err(StoreError::Constraint("tasks.name must not be empty".to_string()));
        }
        let mut tables = self.tables.write().await;
        // Mirrors the tasks.list_id foreign key.
        if !tables.lists.iter().any(|l| l.id == task.list_id) {
            return Err(StoreError::Constraint(
                "tasks.list_id must reference an existing list".to_string(),
            ));
        }
        tables.tasks.push(task.clone());
        Ok(task)
    }

    async fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id && t.list_id == task.list_id)
        {
            stored.name = task.name.clone();
            stored.is_done = task.is_done;
        }
        Ok(())
    }

    async fn remove_task(&self, list_id: Uuid, task_id: Uuid) -> Result<(), StoreError> {
        self.check()?;
        self.tables
            .write()
            .await
            .tasks
            .retain(|t| !(t.id == task_id && t.list_id == list_id));
        Ok(())
    }
}
