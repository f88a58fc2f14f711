//! HTTP surface of the book catalogue API.
//!
//! # Endpoints
//!
//! All routes live under `/bookapi`; see [`routes`] for the full table.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use server::{build_router, run, BookApiServer, StartupError, API_PREFIX};
