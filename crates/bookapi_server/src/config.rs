//! Server configuration.
//!
//! Every setting can be given as a command-line flag or through a
//! `BOOKAPI_*` environment variable; flags win over the environment.

use axum::http::HeaderValue;
use clap::Parser;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "bookapi.sqlite3";
/// Origin of the catalogue frontend's dev server.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5174";

/// Runtime settings for the `bookapi` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "bookapi", version, about = "HTTP CRUD API over a SQLite book catalogue")]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "BOOKAPI_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// TCP port for the HTTP listener.
    #[arg(long, env = "BOOKAPI_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// SQLite database file; created on first start.
    #[arg(long, env = "BOOKAPI_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// Browser origins allowed to call the API. Repeat the flag or separate
    /// values with commas.
    #[arg(
        long = "cors-origin",
        env = "BOOKAPI_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = DEFAULT_CORS_ORIGIN
    )]
    pub cors_origins: Vec<String>,

    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "BOOKAPI_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files. Stderr only when unset.
    #[arg(long, env = "BOOKAPI_LOG_DIR")]
    pub log_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: PathBuf::from(DEFAULT_DATABASE),
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            log_level: None,
            log_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or_else(|| bookapi_core::default_log_level())
    }

    /// Parses the configured origins into header values for the CORS layer.
    pub fn allowed_origins(&self) -> Result<Vec<HeaderValue>, ConfigError> {
        self.cors_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| ConfigError::InvalidCorsOrigin(origin.to_string()))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidCorsOrigin(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCorsOrigin(origin) => write!(f, "invalid CORS origin `{origin}`"),
        }
    }
}

impl Error for ConfigError {}
