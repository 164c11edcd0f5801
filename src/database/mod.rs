//! Persistence layer: entities, migrations and per-concern DAOs
//!
//! Read paths go through the DAOs, which own a clone of the pooled connection.
//! Allocation writes open their own transaction on [`DatabaseManager::connection`].

use crate::config::Config;
use crate::health::{HealthCheckResult, HealthChecker};
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, DatabaseConnection, DbErr};
use thiserror::Error;

pub mod config;
pub mod dao;
pub mod entities;
pub mod migration;

pub use dao::{AllocationsDao, CatalogDao, ReportsDao, ServiceEnvironmentsDao, UsageFilter};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Record not found")]
    NotFound,
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Migration error: {0}")]
    Migration(String),
}

impl From<DbErr> for DatabaseError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(_) => DatabaseError::NotFound,
            DbErr::Migration(message) => DatabaseError::Migration(message),
            other => match other.sql_err() {
                Some(sql_err) => DatabaseError::Constraint(sql_err.to_string()),
                None => DatabaseError::Database(other.to_string()),
            },
        }
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Database manager trait for dependency injection and testing
#[async_trait]
pub trait DatabaseManager: Send + Sync {
    /// Run pending migrations
    async fn migrate(&self) -> DatabaseResult<()>;

    async fn health_check(&self) -> DatabaseResult<()>;

    fn service_environments(&self) -> ServiceEnvironmentsDao;

    fn catalog(&self) -> CatalogDao;

    fn allocations(&self) -> AllocationsDao;

    fn reports(&self) -> ReportsDao;

    /// Direct connection, used to open write transactions
    fn connection(&self) -> &DatabaseConnection;
}

pub struct DatabaseManagerImpl {
    pub connection: DatabaseConnection,
}

impl DatabaseManagerImpl {
    pub async fn new_from_config(config: &Config) -> Result<Self, DatabaseError> {
        let mut options = ConnectOptions::new(config.database.url.clone());
        options
            .max_connections(config.database.max_connections)
            .sqlx_logging(false);

        let connection = sea_orm::Database::connect(options)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl DatabaseManager for DatabaseManagerImpl {
    async fn migrate(&self) -> DatabaseResult<()> {
        use crate::database::migration::Migrator;
        use sea_orm_migration::MigratorTrait;

        tracing::info!("Running database migrations");

        Migrator::up(&self.connection, None)
            .await
            .map_err(|e| DatabaseError::Migration(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("Successfully completed all migrations");
        Ok(())
    }

    async fn health_check(&self) -> DatabaseResult<()> {
        self.connection
            .ping()
            .await
            .map_err(|e| DatabaseError::Database(format!("db error: {}", e)))
    }

    fn service_environments(&self) -> ServiceEnvironmentsDao {
        ServiceEnvironmentsDao::new(self.connection.clone())
    }

    fn catalog(&self) -> CatalogDao {
        CatalogDao::new(self.connection.clone())
    }

    fn allocations(&self) -> AllocationsDao {
        AllocationsDao::new(self.connection.clone())
    }

    fn reports(&self) -> ReportsDao {
        ReportsDao::new(self.connection.clone())
    }

    fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}

#[async_trait]
impl HealthChecker for DatabaseManagerImpl {
    fn name(&self) -> &str {
        "database"
    }

    async fn check(&self) -> HealthCheckResult {
        match self.health_check().await {
            Ok(_) => HealthCheckResult::healthy_with_details(serde_json::json!({
                "status": "healthy",
                "connection": "ok",
                "backend": format!("{:?}", self.connection.get_database_backend()),
            })),
            Err(err) => HealthCheckResult::unhealthy_with_details(
                "DB health check failed".to_string(),
                serde_json::json!({
                    "status": "unhealthy",
                    "error": err.to_string(),
                }),
            ),
        }
    }
}
