/// In-process storage backend
///
/// Keeps users and tasks in ordered maps behind a single `tokio::sync::RwLock`,
/// so each operation is atomic with respect to the others. Identifiers start
/// at 1 and are never reused, even after a delete.
///
/// Data lives as long as the process. Intended for development
/// (`STORAGE_BACKEND=memory`) and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{Storage, StoreError, StoreResult};
use crate::models::{
    task::{NewTask, Task, TaskStatus},
    user::{NewUser, User},
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    last_user_id: i64,
    last_task_id: i64,
}

/// Storage backend held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "user with email {} already exists",
                user.email
            )));
        }

        tables.last_user_id += 1;
        let stored = User {
            id: tables.last_user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;

        tables.last_task_id += 1;
        let stored = Task {
            id: tables.last_task_id,
            title: task.title,
            description: task.description,
            status: TaskStatus::Open,
        };
        tables.tasks.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        Ok(self.tables.read().await.tasks.values().cloned().collect())
    }

    async fn find_task_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn delete_task(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.tasks.remove(&id).is_some())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        }
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: format!("{} description", title),
        }
    }

    #[tokio::test]
    async fn test_user_ids_are_assigned_sequentially() {
        let store = MemoryStore::new();

        let a = store.create_user(new_user("a@example.com")).await.unwrap();
        let b = store.create_user(new_user("b@example.com")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.list_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@example.com")).await.unwrap();

        let result = store.create_user(new_user("a@example.com")).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_user_lookups() {
        let store = MemoryStore::new();
        let created = store.create_user(new_user("a@example.com")).await.unwrap();

        let by_email = store.find_user_by_email("a@example.com").await.unwrap();
        assert_eq!(by_email, Some(created.clone()));

        let by_id = store.find_user_by_id(created.id).await.unwrap();
        assert_eq!(by_id, Some(created));

        assert_eq!(store.find_user_by_email("nobody@example.com").await.unwrap(), None);
        assert_eq!(store.find_user_by_id(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_task_create_fetch_delete() {
        let store = MemoryStore::new();

        let task = store.create_task(new_task("first")).await.unwrap();
        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.title, "first");

        let fetched = store.find_task_by_id(task.id).await.unwrap();
        assert_eq!(fetched, Some(task.clone()));

        assert!(store.delete_task(task.id).await.unwrap());
        assert!(!store.delete_task(task.id).await.unwrap());
        assert_eq!(store.find_task_by_id(task.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_task_ids_not_reused_after_delete() {
        let store = MemoryStore::new();

        let first = store.create_task(new_task("first")).await.unwrap();
        store.delete_task(first.id).await.unwrap();
        let second = store.create_task(new_task("second")).await.unwrap();

        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_list_tasks_ordered_by_id() {
        let store = MemoryStore::new();
        for title in ["a", "b", "c"] {
            store.create_task(new_task(title)).await.unwrap();
        }

        let ids: Vec<i64> = store.list_tasks().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_unique_ids() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.create_task(new_task(&format!("task-{}", i))).await.unwrap().id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn test_health_check() {
        let store = MemoryStore::new();
        assert!(store.health_check().await.is_ok());
        assert_eq!(store.backend_name(), "memory");
    }
}
