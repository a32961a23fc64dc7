//! Relational store on `PostgreSQL`
//!
//! Users, roles, mascot post queues, sales, orders, addresses, shipping,
//! transactions, feedback and the URL cache live here. Each entity has its
//! own file with an `impl Database` block.
//!
//! # Examples
//!
//! ```rust,no_run
//! use twiq::{AppConfig, Database};
//!
//! # async fn example() -> twiq::Result<()> {
//! let config = AppConfig::load()?;
//! let database = Database::from_config(&config).await?;
//! database.init_schema().await?;
//!
//! if let Some(user) = database.get_user_by_phone("9000000000").await? {
//!     println!("verified: {}", user.is_verified());
//! }
//! # Ok(())
//! # }
//! ```

use sqlx::PgPool;

use crate::Result;

mod addresses;
mod feedback;
mod orders;
mod post_queue;
mod sales;
mod schema;
mod shipping;
mod transactions;
mod url_cache;
mod users;

/// Database connection pool wrapper
///
/// Cloning shares the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new database instance from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot open its first connection.
    pub async fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        let pool = Self::pool_options(config)
            .connect(config.database_url())
            .await?;

        tracing::debug!(
            "Database pool configured: max_connections={}, min_connections={}",
            config.max_connections(),
            config.min_connections()
        );

        Ok(Self::new(pool))
    }

    /// Pool that connects on first use; lets routers be built without a server
    ///
    /// # Errors
    ///
    /// Returns an error if the database URL cannot be parsed.
    pub fn lazy_from_config(config: &crate::config::AppConfig) -> Result<Self> {
        let pool = Self::pool_options(config)
            .min_connections(0)
            .connect_lazy(config.database_url())?;
        Ok(Self::new(pool))
    }

    fn pool_options(config: &crate::config::AppConfig) -> sqlx::postgres::PgPoolOptions {
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections())
            .min_connections(config.min_connections())
            .acquire_timeout(std::time::Duration::from_secs(config.connection_timeout()))
    }

    /// Direct pool access for ad-hoc queries
    #[must_use]
    pub const fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}
