//! Data access for users and exercise logs
//!
//! Turns validated request parameters into store operations, resolving the
//! referenced user before any exercise is written or read.
//!
//! The user lookup and the exercise insert are not atomic. Users are never
//! deleted, so a lookup that succeeds stays true for the insert.

use chrono::{Days, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::{StoreError, StoreResult},
    models::{
        CreateExerciseParams, CreateUserParams, ExerciseFilter, ExerciseResponse, LogEntry,
        LogQueryParams, LogResponse, NewExercise, ObjectId, User, UserResponse, format_date,
    },
    repositories::{ExerciseStore, UserStore},
    validation::is_date_valid,
};

/// Entry point for the four tracker operations
#[derive(Clone)]
pub struct TrackerService {
    users: Arc<dyn UserStore>,
    exercises: Arc<dyn ExerciseStore>,
}

impl TrackerService {
    /// Create a service over the given stores
    pub fn new(users: Arc<dyn UserStore>, exercises: Arc<dyn ExerciseStore>) -> Self {
        Self { users, exercises }
    }

    /// Persist a new user
    pub async fn create_user(&self, params: CreateUserParams) -> StoreResult<UserResponse> {
        let user = self.users.create(&params.username).await.inspect_err(|e| {
            if matches!(e, StoreError::DuplicateUsername(_)) {
                warn!("Username {} already taken", params.username);
            }
        })?;

        info!("Created user {} ({})", user.username, user.id);
        Ok(user.into())
    }

    /// All users, projected to id and username
    pub async fn list_users(&self) -> StoreResult<Vec<UserResponse>> {
        let users = self.users.get_all().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Record an exercise for an existing user
    pub async fn create_exercise(
        &self,
        params: CreateExerciseParams,
    ) -> StoreResult<ExerciseResponse> {
        let user = self.resolve_user(&params.user_id).await?;

        let date = match params.date.as_deref() {
            Some(raw) => parse_date(raw)?,
            None => Utc::now().date_naive(),
        };

        let exercise = self
            .exercises
            .create(NewExercise {
                user_id: user.id.clone(),
                date,
                description: params.description,
                duration: params.duration,
            })
            .await?;

        info!("Recorded exercise {} for user {}", exercise.id, user.id);

        Ok(ExerciseResponse {
            user_id: user.id,
            date: format_date(exercise.date),
            description: exercise.description,
            duration: exercise.duration,
            username: user.username,
        })
    }

    /// A user's exercises, optionally bounded by date and capped by `limit`
    pub async fn query_log(&self, params: LogQueryParams) -> StoreResult<LogResponse> {
        let user = self.resolve_user(&params.user_id).await?;

        let filter = ExerciseFilter {
            user_id: user.id.clone(),
            date_from: params.date_from.as_deref().map(parse_date).transpose()?,
            date_to: params.date_to.as_deref().map(parse_date).transpose()?,
            limit: params.limit,
        };

        let log: Vec<LogEntry> = self
            .exercises
            .find(&filter)
            .await?
            .into_iter()
            .map(LogEntry::from)
            .collect();

        Ok(LogResponse {
            user_id: user.id,
            username: user.username,
            count: log.len(),
            log,
        })
    }

    /// Whether the backing store is reachable
    pub async fn health_check(&self) -> StoreResult<bool> {
        self.users.health_check().await
    }

    async fn resolve_user(&self, user_id: &str) -> StoreResult<User> {
        let not_found = || {
            warn!("User {} not found", user_id);
            StoreError::UserNotFound(user_id.to_string())
        };

        let id = ObjectId::parse(user_id).ok_or_else(not_found)?;
        self.users.find_by_id(&id).await?.ok_or_else(not_found)
    }
}

/// Parse `YYYY-MM-DD`, rolling days past the end of the month forward
///
/// `2021-02-30` becomes `2021-03-02`. Days outside 1..=31 and months outside
/// 1..=12 are rejected.
fn parse_date(raw: &str) -> StoreResult<NaiveDate> {
    let invalid = || StoreError::InvalidDate(raw.to_string());

    if !is_date_valid(raw) {
        return Err(invalid());
    }

    let mut parts = raw.splitn(3, '-');
    let mut next = || parts.next().and_then(|p| p.parse::<u32>().ok());
    let (Some(year), Some(month), Some(day)) = (next(), next(), next()) else {
        return Err(invalid());
    };

    if !(1..=31).contains(&day) {
        return Err(invalid());
    }

    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, 1))
        .and_then(|first| first.checked_add_days(Days::new(u64::from(day - 1))))
        .ok_or_else(invalid)
}
