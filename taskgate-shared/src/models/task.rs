/// Task model and database operations
///
/// Tasks are global: any authenticated caller can list, fetch and delete any
/// task. There is no owner column.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('open', 'closed');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(50) NOT NULL,
///     description VARCHAR(155) NOT NULL DEFAULT '',
///     status task_status NOT NULL DEFAULT 'open'
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Maximum title length in characters
pub const MAX_TITLE_LEN: u64 = 50;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_LEN: u64 = 155;

/// Task status
///
/// New tasks are always `Open`. Nothing transitions a task to `Closed` yet;
/// the variant exists so stored rows round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    #[default]
    Open,
    Closed,
}

impl TaskStatus {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "OPEN",
            TaskStatus::Closed => "CLOSED",
        }
    }
}

/// A stored task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
}

impl Task {
    /// Inserts a task with status `Open`.
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, status
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(TaskStatus::Open)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, status FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks ordered by ID
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, status FROM tasks ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Deletes a task
    ///
    /// Returns `false` if no row had this ID.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_open() {
        assert_eq!(TaskStatus::default(), TaskStatus::Open);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(serde_json::to_value(TaskStatus::Open).unwrap(), "OPEN");
        assert_eq!(serde_json::to_value(TaskStatus::Closed).unwrap(), "CLOSED");
        assert_eq!(TaskStatus::Closed.as_str(), "CLOSED");

        let parsed: TaskStatus = serde_json::from_str("\"OPEN\"").unwrap();
        assert_eq!(parsed, TaskStatus::Open);
    }

    #[test]
    fn test_task_json_shape() {
        let task = Task {
            id: 3,
            title: "Write docs".to_string(),
            description: "README first".to_string(),
            status: TaskStatus::Open,
        };
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["title"], "Write docs");
        assert_eq!(json["description"], "README first");
        assert_eq!(json["status"], "OPEN");
    }
}
