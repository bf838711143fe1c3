//! Input validation utilities
//!
//! Shape checks only: nothing here touches the store. Whether a user id
//! resolves or a username is free is decided by the repositories.

use regex::Regex;
use std::sync::OnceLock;

/// Returned when the log query parameters fail [`are_log_params_valid`]
pub const LOG_PARAMS_MESSAGE: &str = "Bad Request. 'userId' is mandatory and must be long 24 characters. 'from' and 'to' are optional: must have the yyyy-mm-dd format. 'limit' is optional: must be an number.";

/// Returned when the exercise form fails [`are_exercise_params_valid`]
pub const EXERCISE_PARAMS_MESSAGE: &str = "Bad Request. 'description', 'duration' and 'userId' are mandatory and cannot be empty strings. 'userId' must be long 24 characters.";

/// Returned when the new-user form fails [`is_username_valid`]
pub const USERNAME_MESSAGE: &str = "Bad Request. The 'username' can contain only letters, digits, ., -, _ and must be long at least 8 characters.";

/// Parameters of an add-exercise request as received
#[derive(Debug, Clone, Copy)]
pub struct ExerciseParams<'a> {
    pub date: Option<&'a str>,
    pub description: Option<&'a str>,
    pub duration: f64,
    pub user_id: &'a str,
}

/// Parameters of a log query as received
#[derive(Debug, Clone, Copy)]
pub struct LogParams<'a> {
    pub date_from: Option<&'a str>,
    pub date_to: Option<&'a str>,
    pub limit: Option<f64>,
    pub user_id: &'a str,
}

/// Syntactic `YYYY-MM-DD` check; `9999-99-99` passes
pub fn is_date_valid(date: &str) -> bool {
    static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = DATE_REGEX.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("Failed to compile date regex")
    });

    regex.is_match(date)
}

/// Any number except NaN, including zero and negatives
pub fn is_number_valid(number: f64) -> bool {
    !number.is_nan()
}

/// Length check only: any 24 UTF-16 code units form a valid user id shape
pub fn is_user_id_valid(user_id: &str) -> bool {
    user_id.encode_utf16().count() == 24
}

/// Validate username: at least 8 of letters, digits, `_`, `.`, `-`
pub fn is_username_valid(username: &str) -> bool {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9_.\-]{8,}$").expect("Failed to compile username regex")
    });

    regex.is_match(username)
}

/// Validate the fields of an add-exercise request
pub fn are_exercise_params_valid(params: &ExerciseParams<'_>) -> bool {
    let date_valid = params.date.is_none_or(is_date_valid);
    let description_valid = params.description.is_some_and(|d| !d.is_empty());
    let duration_valid = is_number_valid(params.duration) && params.duration > 0.0;
    let user_id_valid = is_user_id_valid(params.user_id);

    date_valid && description_valid && duration_valid && user_id_valid
}

/// Validate the fields of a log query
pub fn are_log_params_valid(params: &LogParams<'_>) -> bool {
    let from_valid = params.date_from.is_none_or(is_date_valid);
    let to_valid = params.date_to.is_none_or(is_date_valid);
    let limit_valid = params.limit.is_none_or(is_number_valid);
    let user_id_valid = is_user_id_valid(params.user_id);

    from_valid && to_valid && limit_valid && user_id_valid
}
