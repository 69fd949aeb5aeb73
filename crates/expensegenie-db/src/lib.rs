//! ExpenseGenie Database Layer
//!
//! Persistence for users, budgets, goals and expenses.
//!
//! # Backends
//!
//! - **PostgreSQL**: the [`repos`] module, one repository per table, queried with SQLx
//! - **In-memory**: the [`memory`] module, DashMap-backed, for development and tests
//!
//! Callers only hold the [`store`] traits, so both backends are interchangeable.

pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod repos;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use memory::{MemoryBudgetStore, MemoryExpenseStore, MemoryGoalStore, MemoryUserStore};
pub use models::*;
pub use repos::*;
pub use store::{BudgetStore, ExpenseStore, GoalStore, UserStore};

/// Store handles shared by the API
#[derive(Clone)]
pub struct Database {
    pub users: Arc<dyn UserStore>,
    pub budgets: Arc<dyn BudgetStore>,
    pub goals: Arc<dyn GoalStore>,
    pub expenses: Arc<dyn ExpenseStore>,
    pg: Option<PgPool>,
}

impl Database {
    /// Connect to PostgreSQL, or build in-memory stores when `config.in_memory` is set
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        if config.in_memory {
            info!("Using in-memory stores");
            return Ok(Self::in_memory());
        }
        if config.url.is_empty() {
            return Err(DbError::Connection("database url is not set".to_string()));
        }

        info!("Connecting to PostgreSQL: {}", config.url_masked());

        let pg = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DbError::Connection(format!("PostgreSQL: {}", e)))?;

        info!("Connected to PostgreSQL");

        let db = Self::postgres(pg);
        if config.run_migrations {
            db.migrate().await?;
        }
        Ok(db)
    }

    /// Stores backed by an existing pool
    pub fn postgres(pg: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepo::new(pg.clone())),
            budgets: Arc::new(BudgetRepo::new(pg.clone())),
            goals: Arc::new(GoalRepo::new(pg.clone())),
            expenses: Arc::new(ExpenseRepo::new(pg.clone())),
            pg: Some(pg),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            budgets: Arc::new(MemoryBudgetStore::new()),
            goals: Arc::new(MemoryGoalStore::new()),
            expenses: Arc::new(MemoryExpenseStore::new()),
            pg: None,
        }
    }

    pub fn backend(&self) -> &'static str {
        if self.pg.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Run database migrations. No-op for in-memory stores.
    pub async fn migrate(&self) -> DbResult<()> {
        let Some(pg) = &self.pg else {
            return Ok(());
        };
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(pg)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("Migrations complete");
        Ok(())
    }

    pub async fn health_check(&self) -> DbResult<HealthStatus> {
        let healthy = match &self.pg {
            Some(pg) => sqlx::query("SELECT 1").fetch_one(pg).await.is_ok(),
            None => true,
        };

        Ok(HealthStatus {
            backend: self.backend(),
            healthy,
        })
    }
}

/// Storage health
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub backend: &'static str,
    pub healthy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_health() {
        let db = Database::in_memory();
        db.migrate().await.unwrap();

        let health = db.health_check().await.unwrap();
        assert_eq!(health.backend, "memory");
        assert!(health.healthy);
    }

    #[tokio::test]
    async fn test_connect_in_memory_flag() {
        let config = DatabaseConfig {
            in_memory: true,
            ..DatabaseConfig::default()
        };
        let db = Database::connect(&config).await.unwrap();
        assert_eq!(db.backend(), "memory");
    }

    #[tokio::test]
    async fn test_connect_requires_url() {
        let result = Database::connect(&DatabaseConfig::default()).await;
        assert!(matches!(result, Err(DbError::Connection(_))));
    }
}
