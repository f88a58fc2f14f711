//! # HTTP Server
//!
//! Router assembly, CORS policy and process startup for the book API.

use std::error::Error;
use std::fmt::{Display, Formatter};

use axum::http::Method;
use axum::Router;
use bookapi_core::db::{open_db, DbError};
use bookapi_core::{core_version, init_logging, BookStore, RepoError};
use log::{info, warn};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{ConfigError, ServerConfig};
use crate::routes::book_routes;

/// Path prefix every book endpoint is mounted under.
pub const API_PREFIX: &str = "/bookapi";

/// Builds the complete application router for `store`.
pub fn build_router(store: BookStore, config: &ServerConfig) -> Result<Router, ConfigError> {
    let cors = cors_layer(config)?;
    Ok(Router::new()
        .nest(API_PREFIX, book_routes(store))
        .layer(cors))
}

/// CORS policy: only the configured origins, the four CRUD verbs plus
/// preflight, and any request header.
pub fn cors_layer(config: &ServerConfig) -> Result<CorsLayer, ConfigError> {
    let origins = config.allowed_origins()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any))
}

/// Bound HTTP server ready to accept connections.
pub struct BookApiServer {
    listener: TcpListener,
    router: Router,
}

impl BookApiServer {
    /// Binds the configured address and prepares the router.
    pub async fn bind(config: &ServerConfig, store: BookStore) -> Result<Self, StartupError> {
        let router = build_router(store, config)?;
        let listener = TcpListener::bind(config.socket_addr()).await?;
        Ok(Self { listener, router })
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until Ctrl-C is received.
    pub async fn serve(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("event=server_shutdown module=server status=start reason=ctrl_c"),
        Err(err) => {
            // Without a signal handler the server can only be stopped by killing it.
            warn!("event=server_shutdown module=server status=error error={err}");
            std::future::pending::<()>().await;
        }
    }
}

/// Initializes logging, opens the database and serves until shutdown.
pub async fn run(config: ServerConfig) -> Result<(), StartupError> {
    init_logging(config.log_level(), config.log_dir.as_deref()).map_err(StartupError::Logging)?;

    let conn = open_db(&config.database)?;
    let store = BookStore::new(conn)?;
    let server = BookApiServer::bind(&config, store).await?;

    info!(
        "event=server_start module=server status=ok version={} addr={} database={} cors_origins={}",
        core_version(),
        server.local_addr()?,
        config.database.display(),
        config.cors_origins.join(",")
    );

    server.serve().await?;
    info!("event=server_shutdown module=server status=ok");
    Ok(())
}

/// Failure that prevents the server from starting or keeps it from running.
#[derive(Debug)]
pub enum StartupError {
    Logging(String),
    Config(ConfigError),
    Db(DbError),
    Repo(RepoError),
    Io(std::io::Error),
}

impl Display for StartupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Db(err) => write!(f, "database open failed: {err}"),
            Self::Repo(err) => write!(f, "database not usable: {err}"),
            Self::Io(err) => write!(f, "network error: {err}"),
        }
    }
}

impl Error for StartupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(_) => None,
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for StartupError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for StartupError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for StartupError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<std::io::Error> for StartupError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
