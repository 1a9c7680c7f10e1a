//! Runtime configuration read from environment variables.
//!
//! - `MATH_QUIZ_DB`: on-disk SQLite file for the problem store. When unset the
//!   store lives in memory and is gone when the program exits.
//! - `MATH_QUIZ_LOG`: log file path (defaults to the data directory).
//! - `MATH_QUIZ_SHUFFLE`: `1`/`true`/`yes` shuffles problems when a quiz starts.
//! - `DESMOS_API_KEY`: key appended to graph calculator embed URLs.

use std::path::PathBuf;

pub const DB_ENV: &str = "MATH_QUIZ_DB";
pub const LOG_ENV: &str = "MATH_QUIZ_LOG";
pub const SHUFFLE_ENV: &str = "MATH_QUIZ_SHUFFLE";
pub const GRAPH_API_KEY_ENV: &str = "DESMOS_API_KEY";

const LOG_FILE_NAME: &str = "math-quiz.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Session-scoped: dropped with the process.
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreLocation,
    pub log_path: PathBuf,
    pub shuffle: bool,
    pub graph_api_key: Option<String>,
}

pub fn get_data_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| "C:\\Users\\User".to_string());
        PathBuf::from(home).join(".local\\share\\math-quiz-builder")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/home/user".to_string());
        PathBuf::from(home).join(".local/share/math-quiz-builder")
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match non_empty(DB_ENV) {
            Some(path) => StoreLocation::File(PathBuf::from(path)),
            None => StoreLocation::Memory,
        };

        let log_path = non_empty(LOG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| get_data_dir().join(LOG_FILE_NAME));

        let shuffle = non_empty(SHUFFLE_ENV)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self {
            store,
            log_path,
            shuffle,
            graph_api_key: non_empty(GRAPH_API_KEY_ENV),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
