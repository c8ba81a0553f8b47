//! Service configuration, read from the environment (and `.env` if present).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub registration: RegistrationConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Which [`RegistrationStore`](crate::store::RegistrationStore) backs the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: Backend,

    /// PostgreSQL connection string
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Run the schema script at startup
    #[serde(default = "default_true")]
    pub initialise: bool,

    #[serde(default = "default_init_script")]
    pub init_script: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
    /// Whether company and position must be filled in
    #[serde(default = "default_true")]
    pub require_affiliation: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            url: default_database_url(),
            max_connections: default_max_connections(),
            initialise: true,
            init_script: default_init_script(),
        }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            require_affiliation: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "postgres://postgres@127.0.0.1:5432/prism_db".into()
}

fn default_max_connections() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_init_script() -> PathBuf {
    PathBuf::from("./db.sql")
}

fn default_log_level() -> String {
    "info".into()
}

/// Environment source with `__` separating nested keys. Values are parsed
/// so `SERVER__PORT=8080` and `DATABASE__INITIALISE=false` keep their types.
fn environment() -> config::Environment {
    config::Environment::default()
        .separator("__")
        .try_parsing(true)
}

impl Config {
    /// Load configuration from environment variables, e.g. `DATABASE__URL`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_source(environment())
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
