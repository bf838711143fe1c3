//! Service configuration
//!
//! Read from the process environment with the `config` crate. Database
//! settings live in [`common::database::DatabaseConfig`].

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;

/// Which store implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Application configuration
///
/// # Environment Variables
/// - `APP_PORT`: listening port (default: 3000)
/// - `STORAGE_BACKEND`: `postgres` or `memory` (default: `postgres`)
/// - `VIEWS_DIR`: directory holding `index.html` (default: crate `views/`)
/// - `PUBLIC_DIR`: static asset directory (default: crate `public/`)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_port: u16,
    pub storage_backend: StorageBackend,
    pub views_dir: PathBuf,
    pub public_dir: PathBuf,
}

impl AppConfig {
    /// Load the configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::default())
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("app_port", 3000_i64)?
            .set_default("storage_backend", "postgres")?
            .set_default("views_dir", concat!(env!("CARGO_MANIFEST_DIR"), "/views"))?
            .set_default("public_dir", concat!(env!("CARGO_MANIFEST_DIR"), "/public"))?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }
}
