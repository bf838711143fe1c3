//! Repositories for users and exercises
//!
//! The service only sees the [`UserStore`] and [`ExerciseStore`] traits; the
//! PostgreSQL backend is used in production and the in-memory backend in
//! tests or when `STORAGE_BACKEND=memory`.

use async_trait::async_trait;

use crate::{
    error::StoreResult,
    models::{Exercise, ExerciseFilter, NewExercise, ObjectId, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgExerciseRepository, PgUserRepository};

/// Persistence of users
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; fails with `DuplicateUsername` when the name is taken
    async fn create(&self, username: &str) -> StoreResult<User>;

    /// All users in creation order
    async fn get_all(&self) -> StoreResult<Vec<User>>;

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<User>>;

    async fn health_check(&self) -> StoreResult<bool>;
}

/// Persistence of exercises
#[async_trait]
pub trait ExerciseStore: Send + Sync {
    async fn create(&self, exercise: NewExercise) -> StoreResult<Exercise>;

    /// Exercises matching `filter`, in creation order
    async fn find(&self, filter: &ExerciseFilter) -> StoreResult<Vec<Exercise>>;
}
