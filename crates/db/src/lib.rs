//! Postgres access for the TazeAI gateway.
//!
//! Holds the shared connection pool, the idempotent schema migrations for
//! the identity tables, and the pagination [`Builder`].

mod builder;
mod error;
mod migrations;
mod users;

pub use builder::{Builder, Filter, OrderBy, Page, PageInfo, PaginateOptions, coerce_int};
pub use error::DbError;
pub use migrations::run_migrations;
pub use users::{User, get_user};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tazeai_core::PG_POOL_MAX_CONNECTIONS;

/// Shared database handle: a connection pool constructed once per process.
#[derive(Clone, Debug)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Connect to Postgres. Does not run migrations.
    ///
    /// # Errors
    /// Returns an error if the pool cannot reach the database.
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        tracing::info!("database pool initialized");
        Ok(Self { pool })
    }

    /// Build the pool without touching the network; connections are
    /// established on first use. Handy for tests and tooling.
    ///
    /// # Errors
    /// Returns an error if the connection string cannot be parsed.
    pub fn connect_lazy(database_url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    /// Run the idempotent schema migrations.
    pub async fn migrate(&self) -> Result<(), DbError> {
        run_migrations(&self.pool).await
    }

    /// Access the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
