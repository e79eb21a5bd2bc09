#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Dealerspace database crate.
//!
//! This crate owns the shared connection pool and the tenant-scoped data
//! access layer that every tenant-facing module goes through.
//!
//! # Features
//! - `sqlite` (default), `pg`, `mysql`: enable the matching `SeaORM`/`SQLx` backend
//!
//! # Example
//! ```rust,no_run
//! use dealer_db::{DbConfig, DbHandle};
//! use dealer_db::secure::TenantId;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = DbConfig::load(Some("config/db.yaml"))?;
//! let db = DbHandle::from_config(&cfg).await?;
//!
//! // Per request: bind the resolved tenant
//! let tenant = TenantId::parse("0b6e1f0c-9a4f-4d8e-8d3e-3c1f5b2a7e10")?;
//! let scoped = db.for_tenant(tenant);
//! # let _ = scoped;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(
    not(any(feature = "pg", feature = "mysql", feature = "sqlite")),
    allow(unused_imports, unused_variables, dead_code, unreachable_code)
)]

pub mod config;
pub mod secure;

mod pool_opts;

pub use config::{DbConfig, PoolCfg};
pub use sea_orm::ConnectionTrait as DbConnTrait;

// Used by `#[derive(TenantScoped)]` expansions.
#[doc(hidden)]
pub use uuid;

use std::time::Duration;

#[cfg(any(feature = "pg", feature = "mysql", feature = "sqlite"))]
use pool_opts::ApplyPoolOpts;

use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::secure::{GlobalConn, TenantConn, TenantId};

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for the DB handle and helpers.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid connection parameter: {0}")]
    InvalidParameter(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[cfg(any(feature = "pg", feature = "mysql", feature = "sqlite"))]
    #[error(transparent)]
    Sqlx(#[from] sea_orm::sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    MySql,
    Sqlite,
}

impl DbEngine {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DbEngine::Postgres => "postgres",
            DbEngine::MySql => "mysql",
            DbEngine::Sqlite => "sqlite",
        }
    }
}

/// Connection pool options.
/// Each driver applies the subset it supports.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    /// Minimum number of connections in the pool.
    pub min_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    pub acquire_timeout: Option<Duration>,
    /// Idle timeout before a connection is closed.
    pub idle_timeout: Option<Duration>,
    /// Maximum lifetime for a connection.
    pub max_lifetime: Option<Duration>,
    /// Test connection health before acquire.
    pub test_before_acquire: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            max_lifetime: None,
            test_before_acquire: false,
        }
    }
}

/// Shared database handle.
///
/// Wraps the process-wide connection pool. Cloning is cheap and every clone
/// talks to the same pool, so one handle is created at startup and injected
/// wherever a tenant-scoped or global connection has to be built.
#[derive(Debug, Clone)]
pub struct DbHandle {
    engine: DbEngine,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Detect engine by DSN scheme.
    ///
    /// # Errors
    /// Returns `DbError::UnknownDsn` if the DSN scheme is not recognized.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();

        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("mysql://") {
            Ok(DbEngine::MySql)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_credentials_in_dsn(dsn)))
        }
    }

    /// Connect using a loaded [`DbConfig`].
    ///
    /// `${VAR}` references in the DSN are expanded from the environment.
    ///
    /// # Errors
    /// Returns an error if expansion fails, the DSN is invalid or the connection fails.
    pub async fn from_config(cfg: &DbConfig) -> Result<Self> {
        let dsn = cfg.resolved_dsn()?;
        Self::connect(&dsn, ConnectOpts::from(&cfg.pool)).await
    }

    /// Connect and build handle.
    ///
    /// In-memory `SQLite` DSNs are pinned to a single long-lived connection,
    /// since every new connection would otherwise open an empty database.
    ///
    /// # Errors
    /// Returns an error if the connection fails or the DSN is invalid.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        tracing::debug!(
            dsn = %redact_credentials_in_dsn(dsn),
            engine = engine.as_str(),
            "Building database connection"
        );

        let sea = match engine {
            #[cfg(feature = "pg")]
            DbEngine::Postgres => {
                let pool = sea_orm::sqlx::postgres::PgPoolOptions::new()
                    .apply(&opts)
                    .connect(dsn)
                    .await?;
                sea_orm::SqlxPostgresConnector::from_sqlx_postgres_pool(pool)
            }
            #[cfg(not(feature = "pg"))]
            DbEngine::Postgres => {
                return Err(DbError::FeatureDisabled("PostgreSQL feature not enabled"));
            }
            #[cfg(feature = "mysql")]
            DbEngine::MySql => {
                let pool = sea_orm::sqlx::mysql::MySqlPoolOptions::new()
                    .apply(&opts)
                    .connect(dsn)
                    .await?;
                sea_orm::SqlxMySqlConnector::from_sqlx_mysql_pool(pool)
            }
            #[cfg(not(feature = "mysql"))]
            DbEngine::MySql => {
                return Err(DbError::FeatureDisabled("MySQL feature not enabled"));
            }
            #[cfg(feature = "sqlite")]
            DbEngine::Sqlite => {
                use std::str::FromStr;

                let connect_opts = sea_orm::sqlx::sqlite::SqliteConnectOptions::from_str(dsn)?
                    .create_if_missing(true)
                    .foreign_keys(true);

                let mut pool_opts = sea_orm::sqlx::sqlite::SqlitePoolOptions::new().apply(&opts);
                if is_memory_dsn(dsn) {
                    pool_opts = pool_opts
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None);
                }

                let pool = pool_opts.connect_with(connect_opts).await?;
                sea_orm::SqlxSqliteConnector::from_sqlx_sqlite_pool(pool)
            }
            #[cfg(not(feature = "sqlite"))]
            DbEngine::Sqlite => {
                return Err(DbError::FeatureDisabled("SQLite feature not enabled"));
            }
        };

        Ok(Self { engine, sea })
    }

    /// Wrap an existing `SeaORM` connection (e.g. one built by a test harness).
    #[must_use]
    pub fn from_connection(sea: DatabaseConnection) -> Self {
        let engine = match sea.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => DbEngine::Postgres,
            sea_orm::DatabaseBackend::MySql => DbEngine::MySql,
            sea_orm::DatabaseBackend::Sqlite => DbEngine::Sqlite,
        };
        Self { engine, sea }
    }

    #[must_use]
    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// Build the tenant-scoped connection for one request.
    ///
    /// Does not check that the tenant exists or is active; that is the job
    /// of the tenant resolution step that produced `tenant`.
    #[must_use]
    pub fn for_tenant(&self, tenant: TenantId) -> TenantConn {
        TenantConn::new(self.sea.clone(), tenant)
    }

    /// Build an unscoped connection for platform-level administration.
    ///
    /// Bypasses tenant isolation entirely. Callers must be gated by
    /// super-admin authorization before reaching this point.
    #[must_use]
    pub fn global(&self) -> GlobalConn {
        GlobalConn::new(self.sea.clone())
    }
}

/// Returns true for `SQLite` DSNs that point at a private in-memory database.
#[must_use]
pub fn is_memory_dsn(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// Replace the password component of a DSN with `***` for logging.
#[must_use]
pub fn redact_credentials_in_dsn(dsn: &str) -> String {
    if !dsn.contains('@') {
        return dsn.to_owned();
    }
    match url::Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() && parsed.set_password(Some("***")).is_err() {
                return "***".to_owned();
            }
            parsed.to_string()
        }
        Err(_) => "***".to_owned(),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn detect_engine_by_scheme() {
        assert_eq!(
            DbHandle::detect("postgres://u:p@localhost/db").unwrap(),
            DbEngine::Postgres
        );
        assert_eq!(
            DbHandle::detect("mysql://u:p@localhost/db").unwrap(),
            DbEngine::MySql
        );
        assert_eq!(
            DbHandle::detect("sqlite::memory:").unwrap(),
            DbEngine::Sqlite
        );
        assert!(matches!(
            DbHandle::detect("redis://localhost"),
            Err(DbError::UnknownDsn(_))
        ));
    }

    #[test]
    fn redacts_password() {
        let redacted = redact_credentials_in_dsn("postgres://app:secret@db:5432/dealers");
        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("***"));
        assert_eq!(redact_credentials_in_dsn("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn memory_dsn_detection() {
        assert!(is_memory_dsn("sqlite::memory:"));
        assert!(is_memory_dsn("sqlite://file:shared?mode=memory&cache=shared"));
        assert!(!is_memory_dsn("sqlite://data/dealers.db"));
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn connect_sqlite_memory() {
        let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
            .await
            .unwrap();
        assert_eq!(db.engine(), DbEngine::Sqlite);
    }
}
