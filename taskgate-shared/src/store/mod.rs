/// Storage gateway
///
/// [`Storage`] is the only path by which request handlers and the
/// authorization middleware read or write users and tasks. Callers hold an
/// `Arc<dyn Storage>` and never name a concrete backend.
///
/// # Contract
///
/// Every implementation must:
///
/// - assign identifiers itself, unique and increasing per entity kind, never reused
/// - return `Ok(None)` for lookups that match nothing (never a placeholder record)
/// - apply `create_*` and `delete_task` fully or return an error
/// - reject a second user with an existing email as [`StoreError::Conflict`]
///
/// # Backends
///
/// - [`postgres::PgStore`]: production backend over a `sqlx` pool
/// - [`memory::MemoryStore`]: process-local backend for development and tests

use async_trait::async_trait;

use crate::models::{
    task::{NewTask, Task},
    user::{NewUser, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness rule was violated (e.g. duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend failed (connection, timeout, query error)
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// Result alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Capability contract every storage backend implements
#[async_trait]
pub trait Storage: Send + Sync {
    /// Creates a user; the backend assigns `id` and `created_at`.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Lists all users ordered by ID.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Finds a user by exact email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Finds a user by ID.
    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Creates a task with status `Open`.
    async fn create_task(&self, task: NewTask) -> StoreResult<Task>;

    /// Lists all tasks ordered by ID.
    async fn list_tasks(&self) -> StoreResult<Vec<Task>>;

    /// Finds a task by ID.
    async fn find_task_by_id(&self, id: i64) -> StoreResult<Option<Task>>;

    /// Deletes a task; `Ok(false)` if it did not exist.
    async fn delete_task(&self, id: i64) -> StoreResult<bool>;

    /// Checks that the backend is reachable.
    async fn health_check(&self) -> StoreResult<()>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
