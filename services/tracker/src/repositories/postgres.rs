//! PostgreSQL storage backend

use async_trait::async_trait;
use common::error::DatabaseError;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::info;

use super::{ExerciseStore, UserStore};
use crate::{
    error::{StoreError, StoreResult},
    models::{Exercise, ExerciseFilter, NewExercise, ObjectId, User},
};

/// Tables are created on startup when absent; `seq` records insertion order
const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        seq BIGSERIAL NOT NULL,
        id CHAR(24) PRIMARY KEY,
        username TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS exercises (
        seq BIGSERIAL NOT NULL,
        id CHAR(24) PRIMARY KEY,
        user_id CHAR(24) NOT NULL,
        date DATE NOT NULL,
        description TEXT NOT NULL,
        duration BIGINT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS exercises_user_id_date_idx ON exercises (user_id, date)",
];

/// Create the `users` and `exercises` tables if they do not exist yet
pub async fn init_schema(pool: &PgPool) -> StoreResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(DatabaseError::Query)?;
    }

    info!("Database schema ready");
    Ok(())
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    Ok(User {
        id: object_id(row.get("id"))?,
        username: row.get("username"),
    })
}

fn exercise_from_row(row: &PgRow) -> StoreResult<Exercise> {
    Ok(Exercise {
        id: object_id(row.get("id"))?,
        user_id: object_id(row.get("user_id"))?,
        date: row.get("date"),
        description: row.get("description"),
        duration: row.get("duration"),
    })
}

fn object_id(raw: String) -> StoreResult<ObjectId> {
    ObjectId::parse(raw.trim()).ok_or_else(|| {
        let decode = sqlx::Error::Decode(format!("malformed object id {:?}", raw).into());
        StoreError::Database(DatabaseError::Query(decode))
    })
}

/// User repository for database operations
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn create(&self, username: &str) -> StoreResult<User> {
        info!("Creating new user: {}", username);

        let row = sqlx::query(
            r#"
            INSERT INTO users (id, username)
            VALUES ($1, $2)
            RETURNING id, username
            "#,
        )
        .bind(ObjectId::new().as_str())
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = DatabaseError::Query(e);
            if err.is_unique_violation() {
                StoreError::DuplicateUsername(username.to_string())
            } else {
                StoreError::Database(err)
            }
        })?;

        user_from_row(&row)
    }

    async fn get_all(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, username
            FROM users
            ORDER BY seq
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        rows.iter().map(user_from_row).collect()
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(common::database::health_check(&self.pool).await?)
    }
}

/// Exercise repository for database operations
#[derive(Clone)]
pub struct PgExerciseRepository {
    pool: PgPool,
}

impl PgExerciseRepository {
    /// Create a new exercise repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Build the log query: user, optional inclusive date bounds, optional cap
fn log_query(filter: &ExerciseFilter) -> QueryBuilder<'_, Postgres> {
    let mut query = QueryBuilder::new(
        "SELECT id, user_id, date, description, duration FROM exercises WHERE user_id = ",
    );
    query.push_bind(filter.user_id.as_str());

    if let Some(from) = filter.date_from {
        query.push(" AND date >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        query.push(" AND date <= ").push_bind(to);
    }

    query.push(" ORDER BY seq");

    if let Some(limit) = filter.limit.filter(|l| *l > 0) {
        query.push(" LIMIT ").push_bind(limit);
    }

    query
}

#[async_trait]
impl ExerciseStore for PgExerciseRepository {
    async fn create(&self, exercise: NewExercise) -> StoreResult<Exercise> {
        let row = sqlx::query(
            r#"
            INSERT INTO exercises (id, user_id, date, description, duration)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, date, description, duration
            "#,
        )
        .bind(ObjectId::new().as_str())
        .bind(exercise.user_id.as_str())
        .bind(exercise.date)
        .bind(&exercise.description)
        .bind(exercise.duration)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        exercise_from_row(&row)
    }

    async fn find(&self, filter: &ExerciseFilter) -> StoreResult<Vec<Exercise>> {
        let mut query = log_query(filter);
        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        rows.iter().map(exercise_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn filter() -> ExerciseFilter {
        ExerciseFilter {
            user_id: ObjectId::parse("5f3c1e2a9b7d4c0012345678").expect("valid id"),
            date_from: None,
            date_to: None,
            limit: None,
        }
    }

    #[test]
    fn test_log_query_user_only() {
        let filter = filter();
        let query = log_query(&filter);

        assert_eq!(
            query.sql(),
            "SELECT id, user_id, date, description, duration FROM exercises WHERE user_id = $1 ORDER BY seq"
        );
    }

    #[test]
    fn test_log_query_with_bounds_and_limit() {
        let filter = ExerciseFilter {
            date_from: NaiveDate::from_ymd_opt(2021, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2021, 1, 31),
            limit: Some(3),
            ..filter()
        };
        let query = log_query(&filter);

        assert_eq!(
            query.sql(),
            "SELECT id, user_id, date, description, duration FROM exercises WHERE user_id = $1 AND date >= $2 AND date <= $3 ORDER BY seq LIMIT $4"
        );
    }

    #[test]
    fn test_log_query_ignores_non_positive_limit() {
        let filter = ExerciseFilter {
            date_to: NaiveDate::from_ymd_opt(2021, 1, 31),
            limit: Some(0),
            ..filter()
        };
        let query = log_query(&filter);

        assert_eq!(
            query.sql(),
            "SELECT id, user_id, date, description, duration FROM exercises WHERE user_id = $1 AND date <= $2 ORDER BY seq"
        );
    }
}
