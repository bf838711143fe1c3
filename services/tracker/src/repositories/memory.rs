//! In-memory storage backend

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use super::{ExerciseStore, UserStore};
use crate::{
    error::{StoreError, StoreResult},
    models::{Exercise, ExerciseFilter, NewExercise, ObjectId, User},
};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    exercises: Vec<Exercise>,
}

/// Both collections behind one lock; vectors keep insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of exercises across all users
    #[cfg(test)]
    pub async fn exercise_count(&self) -> usize {
        self.collections.lock().await.exercises.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, username: &str) -> StoreResult<User> {
        let mut collections = self.collections.lock().await;

        if collections.users.iter().any(|u| u.username == username) {
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }

        let user = User {
            id: ObjectId::new(),
            username: username.to_string(),
        };
        collections.users.push(user.clone());
        info!("Created user {} in memory store", user.id);

        Ok(user)
    }

    async fn get_all(&self) -> StoreResult<Vec<User>> {
        Ok(self.collections.lock().await.users.clone())
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<User>> {
        let collections = self.collections.lock().await;
        Ok(collections.users.iter().find(|u| &u.id == id).cloned())
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl ExerciseStore for MemoryStore {
    async fn create(&self, exercise: NewExercise) -> StoreResult<Exercise> {
        let exercise = Exercise {
            id: ObjectId::new(),
            user_id: exercise.user_id,
            date: exercise.date,
            description: exercise.description,
            duration: exercise.duration,
        };
        self.collections.lock().await.exercises.push(exercise.clone());

        Ok(exercise)
    }

    async fn find(&self, filter: &ExerciseFilter) -> StoreResult<Vec<Exercise>> {
        let collections = self.collections.lock().await;
        let matches = collections.exercises.iter().filter(|e| {
            e.user_id == filter.user_id
                && filter.date_from.is_none_or(|from| e.date >= from)
                && filter.date_to.is_none_or(|to| e.date <= to)
        });

        let exercises = match filter.limit {
            Some(limit) if limit > 0 => matches
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .cloned()
                .collect(),
            _ => matches.cloned().collect(),
        };

        Ok(exercises)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).expect("valid date")
    }

    async fn seed(store: &MemoryStore, user_id: &ObjectId, days: &[u32]) {
        for d in days {
            ExerciseStore::create(
                store,
                NewExercise {
                    user_id: user_id.clone(),
                    date: day(*d),
                    description: format!("session {}", d),
                    duration: 20,
                },
            )
            .await
            .expect("insert exercise");
        }
    }

    #[tokio::test]
    async fn test_username_uniqueness() {
        let store = MemoryStore::new();

        let first = UserStore::create(&store, "runner_one").await.expect("first user");
        let err = UserStore::create(&store, "runner_one")
            .await
            .expect_err("duplicate must fail");

        assert!(matches!(err, StoreError::DuplicateUsername(name) if name == "runner_one"));
        assert_eq!(store.get_all().await.expect("list users"), vec![first]);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let store = MemoryStore::new();
        let user = UserStore::create(&store, "runner_one").await.expect("user");

        assert_eq!(
            store.find_by_id(&user.id).await.expect("lookup"),
            Some(user)
        );
        assert_eq!(store.find_by_id(&ObjectId::new()).await.expect("lookup"), None);
    }

    #[tokio::test]
    async fn test_filter_keeps_insertion_order() {
        let store = MemoryStore::new();
        let user = ObjectId::new();
        let other = ObjectId::new();
        seed(&store, &user, &[5, 1, 3, 2, 4]).await;
        seed(&store, &other, &[1]).await;

        let all = store
            .find(&ExerciseFilter {
                user_id: user.clone(),
                date_from: None,
                date_to: None,
                limit: None,
            })
            .await
            .expect("find");
        let dates: Vec<_> = all.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(5), day(1), day(3), day(2), day(4)]);

        let bounded = store
            .find(&ExerciseFilter {
                user_id: user.clone(),
                date_from: Some(day(2)),
                date_to: Some(day(4)),
                limit: None,
            })
            .await
            .expect("find");
        let dates: Vec<_> = bounded.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(3), day(2), day(4)]);
    }

    #[tokio::test]
    async fn test_limit_only_applies_when_positive() {
        let store = MemoryStore::new();
        let user = ObjectId::new();
        seed(&store, &user, &[1, 2, 3]).await;

        for (limit, expected) in [(Some(2), 2), (Some(0), 3), (Some(-4), 3), (None, 3)] {
            let found = store
                .find(&ExerciseFilter {
                    user_id: user.clone(),
                    date_from: None,
                    date_to: None,
                    limit,
                })
                .await
                .expect("find");
            assert_eq!(found.len(), expected, "limit {:?}", limit);
        }
    }
}
