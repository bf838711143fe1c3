//! Entities, request payloads and response bodies

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::{
        OnceLock,
        atomic::{AtomicU32, Ordering},
    },
};

/// Store-assigned 24-character hexadecimal identifier
///
/// Layout: 4-byte big-endian seconds since the epoch, 5 bytes that are
/// random per process, 3-byte wrapping counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        static PROCESS_BYTES: OnceLock<[u8; 5]> = OnceLock::new();
        static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

        let timestamp = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
        let process = PROCESS_BYTES.get_or_init(rand::random);
        let count = COUNTER
            .get_or_init(|| AtomicU32::new(rand::random()))
            .fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(process);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);

        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Accept exactly 24 hexadecimal characters, normalised to lowercase
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() == 24 && value.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(value.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: ObjectId,
    pub username: String,
}

/// Exercise entity as persisted
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub date: NaiveDate,
    pub description: String,
    pub duration: i64,
}

/// Exercise ready to be persisted, date already normalised
#[derive(Debug, Clone)]
pub struct NewExercise {
    pub user_id: ObjectId,
    pub date: NaiveDate,
    pub description: String,
    pub duration: i64,
}

/// Filter applied to a user's exercises; bounds are inclusive
#[derive(Debug, Clone)]
pub struct ExerciseFilter {
    pub user_id: ObjectId,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Only positive values cap the result
    pub limit: Option<i64>,
}

/// Validated new-user parameters
#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
}

/// Validated add-exercise parameters
#[derive(Debug, Clone)]
pub struct CreateExerciseParams {
    pub date: Option<String>,
    pub description: String,
    pub duration: i64,
    pub user_id: String,
}

/// Validated log query parameters
#[derive(Debug, Clone)]
pub struct LogQueryParams {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: Option<i64>,
    pub user_id: String,
}

/// Form body of `POST /api/exercise/new-user`
#[derive(Debug, Deserialize)]
pub struct NewUserForm {
    #[serde(default)]
    pub username: String,
}

/// Form body of `POST /api/exercise/add`
#[derive(Debug, Deserialize)]
pub struct NewExerciseForm {
    #[serde(default, rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    pub date: Option<String>,
}

/// Query string of `GET /api/exercise/log`
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    #[serde(default, rename = "userId")]
    pub user_id: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<String>,
}

/// User as exposed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Result of adding an exercise; `_id` echoes the user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseResponse {
    #[serde(rename = "_id")]
    pub user_id: ObjectId,
    pub date: String,
    pub description: String,
    pub duration: i64,
    pub username: String,
}

/// One entry of an exercise log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: String,
    pub description: String,
    pub duration: i64,
}

impl From<Exercise> for LogEntry {
    fn from(exercise: Exercise) -> Self {
        Self {
            date: format_date(exercise.date),
            description: exercise.description,
            duration: exercise.duration,
        }
    }
}

/// Filtered exercise log of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogResponse {
    #[serde(rename = "_id")]
    pub user_id: ObjectId,
    pub username: String,
    pub count: usize,
    pub log: Vec<LogEntry>,
}

/// Render a date as `Sun Feb 28 2021`, independent of locale
pub fn format_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Leading-integer parse: optional sign, optional `0x` prefix, then digits;
/// anything after the digits is ignored
///
/// Yields NaN when no digit is found so the result can go straight through
/// [`crate::validation::is_number_valid`].
pub fn parse_int(value: &str) -> f64 {
    let trimmed = value.trim();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };

    let (radix, body) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let digits: Vec<u32> = body.chars().map_while(|c| c.to_digit(radix)).collect();
    if digits.is_empty() {
        return f64::NAN;
    }

    let magnitude = digits
        .iter()
        .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(*d));
    sign * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_generation() {
        let first = ObjectId::new();
        let second = ObjectId::new();

        assert_eq!(first.as_str().len(), 24);
        assert_ne!(first, second);
        assert_eq!(ObjectId::parse(first.as_str()), Some(first));
    }

    #[test]
    fn test_object_id_parse() {
        assert_eq!(
            ObjectId::parse("5F3C1E2A9B7D4C0012345678").map(|id| id.to_string()),
            Some("5f3c1e2a9b7d4c0012345678".to_string())
        );
        assert!(ObjectId::parse("zzzzzzzzzzzzzzzzzzzzzzzz").is_none());
        assert!(ObjectId::parse("5f3c1e2a").is_none());
        assert!(ObjectId::parse("").is_none());
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2021, 2, 28).expect("valid date");
        assert_eq!(format_date(date), "Sun Feb 28 2021");

        let date = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
        assert_eq!(format_date(date), "Wed Jan 01 2020");
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("30"), 30.0);
        assert_eq!(parse_int(" 45 "), 45.0);
        assert_eq!(parse_int("30min"), 30.0);
        assert_eq!(parse_int("-5"), -5.0);
        assert_eq!(parse_int("+7"), 7.0);
        assert_eq!(parse_int("12.9"), 12.0);
        assert!(parse_int("abc").is_nan());
        assert!(parse_int("").is_nan());
        assert!(parse_int("-").is_nan());
        assert_eq!(parse_int("0x10"), 16.0);
        assert_eq!(parse_int("-0XfF"), -255.0);
        assert!(parse_int("0x").is_nan());
        assert!(parse_int("0xg1").is_nan());
    }

    #[test]
    fn test_log_response_shape() {
        let response = LogResponse {
            user_id: ObjectId::parse("5f3c1e2a9b7d4c0012345678").expect("valid id"),
            username: "runner_one".to_string(),
            count: 1,
            log: vec![LogEntry {
                date: "Sun Feb 28 2021".to_string(),
                description: "running".to_string(),
                duration: 30,
            }],
        };

        let value = serde_json::to_value(&response).expect("serializable");
        assert_eq!(value["_id"], "5f3c1e2a9b7d4c0012345678");
        assert_eq!(value["count"], 1);
        assert_eq!(value["log"][0]["date"], "Sun Feb 28 2021");
        assert_eq!(value["log"][0]["duration"], 30);
    }
}
