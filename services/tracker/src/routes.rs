//! Tracker service routes

use axum::{
    Form, Json, Router,
    extract::{
        Query, State,
        rejection::{FormRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, warn};

use crate::{
    error::{ApiError, ApiResult},
    models::{
        CreateExerciseParams, CreateUserParams, LogQuery, LogQueryParams, NewExerciseForm,
        NewUserForm, parse_int,
    },
    state::AppState,
    validation::{
        EXERCISE_PARAMS_MESSAGE, ExerciseParams, LOG_PARAMS_MESSAGE, LogParams, USERNAME_MESSAGE,
        are_exercise_params_valid, are_log_params_valid, is_username_valid,
    },
};

/// Create the router for the tracker service
pub fn create_router(state: AppState) -> Router {
    let index = ServeFile::new(state.views_dir.join("index.html"));
    let assets = ServeDir::new(&state.public_dir);

    Router::new()
        .route_service("/", index)
        .route("/health", get(health_check))
        .route("/api/exercise/log", get(get_log))
        .route("/api/exercise/add", post(add_exercise))
        .route("/api/exercise/users", get(get_users))
        .route("/api/exercise/new-user", post(create_user))
        .fallback_service(assets)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.health_check().await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "exercise-tracker"
            })),
        ),
        Ok(false) | Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unavailable",
                "service": "exercise-tracker"
            })),
        ),
    }
}

/// Exercise log of a user
pub async fn get_log(
    State(state): State<AppState>,
    query: Result<Query<LogQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query.map_err(|e| {
        warn!("Malformed log query: {}", e);
        ApiError::Validation(LOG_PARAMS_MESSAGE)
    })?;
    let limit = query.limit.as_deref().map(parse_int);

    let params = LogParams {
        date_from: query.from.as_deref(),
        date_to: query.to.as_deref(),
        limit,
        user_id: &query.user_id,
    };
    if !are_log_params_valid(&params) {
        return Err(ApiError::Validation(LOG_PARAMS_MESSAGE));
    }

    let log = state
        .service
        .query_log(LogQueryParams {
            date_from: query.from,
            date_to: query.to,
            limit: limit.map(|l| l as i64),
            user_id: query.user_id,
        })
        .await?;

    Ok(Json(log))
}

/// Add an exercise to a user
pub async fn add_exercise(
    State(state): State<AppState>,
    form: Result<Form<NewExerciseForm>, FormRejection>,
) -> ApiResult<impl IntoResponse> {
    let Form(form) = form.map_err(|e| {
        warn!("Malformed exercise form: {}", e);
        ApiError::Validation(EXERCISE_PARAMS_MESSAGE)
    })?;
    let date = form
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let description = form.description.trim();
    let duration = parse_int(&form.duration);
    let user_id = form.user_id.trim();

    let params = ExerciseParams {
        date,
        description: Some(description),
        duration,
        user_id,
    };
    if !are_exercise_params_valid(&params) {
        return Err(ApiError::Validation(EXERCISE_PARAMS_MESSAGE));
    }

    let exercise = state
        .service
        .create_exercise(CreateExerciseParams {
            date: date.map(str::to_string),
            description: description.to_string(),
            duration: duration as i64,
            user_id: user_id.to_string(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(exercise)))
}

/// Get all users
pub async fn get_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = state.service.list_users().await.map_err(|e| {
        error!("Failed to get users: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(users))
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    form: Result<Form<NewUserForm>, FormRejection>,
) -> ApiResult<impl IntoResponse> {
    let Form(form) = form.map_err(|e| {
        warn!("Malformed new-user form: {}", e);
        ApiError::Validation(USERNAME_MESSAGE)
    })?;
    let username = form.username.trim();
    if !is_username_valid(username) {
        return Err(ApiError::Validation(USERNAME_MESSAGE));
    }

    let user = state
        .service
        .create_user(CreateUserParams {
            username: username.to_string(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}
