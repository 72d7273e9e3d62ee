//! PostgreSQL production store reading a mirror of the tracking database.
//!
//! ## Configuration
//!
//! All settings can be configured via environment variables:
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 10)
//! - `DB_MIN_CONNECTIONS`: Minimum idle connections (default: 2)
//! - `DB_CONNECT_TIMEOUT_SECS`: Connection timeout (default: 10)
//! - `DB_IDLE_TIMEOUT_SECS`: Idle connection timeout (default: 300)
//! - `DB_MAX_LIFETIME_SECS`: Max connection lifetime (default: 1800)
//!
//! ## Tables
//!
//! ```text
//! entities        (id, project_id, entity_type, category, code)
//! steps           (id, short_name)
//! tasks           (id, entity_id, content, step_id)
//! published_files (id, project_id, entity_id, task_id, name, version_number,
//!                  path, published_file_type, updated_at)
//!                 UNIQUE (project_id, entity_id, name, version_number)
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;

use crate::types::{
    EntityKind, EntityRef, NewPublish, ProjectRef, PublishRecord, StepRef, TaskRef,
};
use super::{ProductionStore, TaskMatch};

/// Configuration for PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL.
    pub database_url: String,
    /// Maximum connections in pool (default: 10).
    pub max_connections: u32,
    /// Minimum idle connections to keep warm (default: 2).
    pub min_connections: u32,
    /// Connection acquire timeout in seconds (default: 10).
    pub connect_timeout_secs: u64,
    /// Idle connection timeout in seconds (default: 300 = 5 min).
    pub idle_timeout_secs: u64,
    /// Maximum connection lifetime in seconds (default: 1800 = 30 min).
    pub max_lifetime_secs: u64,
}

impl PostgresConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/production".to_string()),
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            idle_timeout_secs: std::env::var("DB_IDLE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            max_lifetime_secs: std::env::var("DB_MAX_LIFETIME_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1800),
        }
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Error type for PostgreSQL store.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Version already registered for this base name.
    #[error("Publish '{name}' v{version} already exists")]
    VersionExists {
        /// Published base name.
        name: String,
        /// Conflicting version.
        version: u32,
    },
}

/// PostgreSQL production store.
pub struct PostgresProductionStore {
    pool: PgPool,
}

impl PostgresProductionStore {
    /// Create a new store with the given configuration.
    pub async fn new(config: PostgresConfig) -> Result<Self, sqlx::Error> {
        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            connect_timeout_secs = config.connect_timeout_secs,
            "Initializing PostgreSQL connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .test_before_acquire(true)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a store from environment variables.
    pub async fn from_env() -> Result<Self, sqlx::Error> {
        Self::new(PostgresConfig::from_env()).await
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check if the database is reachable.
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }

    fn parse_task_row(row: &PgRow) -> Result<TaskRef, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let content: String = row.try_get("content")?;
        let step_id: i64 = row.try_get("step_id")?;
        let short_name: String = row.try_get("short_name")?;
        Ok(TaskRef::new(id as u64, content, StepRef::new(step_id as u64, short_name)))
    }

    fn parse_publish_row(row: &PgRow) -> Result<PublishRecord, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let version: i32 = row.try_get("version_number")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
        let publish_type: Option<String> = row.try_get("published_file_type")?;

        Ok(PublishRecord {
            id: id as u64,
            name: row.try_get("name")?,
            version_number: version.max(0) as u32,
            updated_at,
            path: row.try_get::<Option<String>, _>("path")?.unwrap_or_default(),
            publish_type: publish_type.and_then(|s| s.parse().ok()),
        })
    }
}

#[async_trait]
impl ProductionStore for PostgresProductionStore {
    type Error = PostgresError;

    async fn find_entity(
        &self,
        project: &ProjectRef,
        kind: EntityKind,
        category: &str,
        code: &str,
    ) -> Result<Option<EntityRef>, Self::Error> {
        let row = sqlx::query(
            r#"
            SELECT id
            FROM entities
            WHERE project_id = $1 AND entity_type = $2 AND category = $3 AND code = $4
            ORDER BY id
            LIMIT 1
            "#
        )
        .bind(project.id as i64)
        .bind(kind.as_str())
        .bind(category)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => {
                let id: i64 = r.try_get("id")?;
                Ok(Some(EntityRef::new(kind, id as u64, code, category)))
            }
            None => Ok(None),
        }
    }

    async fn find_task(&self, entity: &EntityRef, by: &TaskMatch) -> Result<Option<TaskRef>, Self::Error> {
        let (column, value) = match by {
            TaskMatch::ByName(name) => ("t.content", name),
            TaskMatch::ByStep(step) => ("s.short_name", step),
        };
        let sql = format!(
            r#"
            SELECT t.id, t.content, t.step_id, s.short_name
            FROM tasks t
            JOIN steps s ON s.id = t.step_id
            WHERE t.entity_id = $1 AND {} = $2
            ORDER BY t.id
            LIMIT 1
            "#,
            column
        );

        let row = sqlx::query(&sql)
            .bind(entity.id as i64)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(Self::parse_task_row(r)?)),
            None => Ok(None),
        }
    }

    async fn find_publish(
        &self,
        project: &ProjectRef,
        entity: &EntityRef,
        base_name: &str,
    ) -> Result<Option<PublishRecord>, Self::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, name, version_number, path, published_file_type, updated_at
            FROM published_files
            WHERE project_id = $1 AND entity_id = $2 AND name = $3
            ORDER BY version_number DESC, id DESC
            LIMIT 1
            "#
        )
        .bind(project.id as i64)
        .bind(entity.id as i64)
        .bind(base_name)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(Self::parse_publish_row(r)?)),
            None => Ok(None),
        }
    }

    async fn register_publish(&self, publish: NewPublish) -> Result<PublishRecord, Self::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO published_files
                (project_id, entity_id, task_id, name, version_number, path,
                 published_file_type, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, now())
            RETURNING id, name, version_number, path, published_file_type, updated_at
            "#
        )
        .bind(publish.project.id as i64)
        .bind(publish.entity.id as i64)
        .bind(publish.task.id as i64)
        .bind(&publish.name)
        .bind(publish.version_number as i32)
        .bind(&publish.path)
        .bind(publish.publish_type.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(Self::parse_publish_row(&row)?),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(PostgresError::VersionExists {
                name: publish.name,
                version: publish.version_number,
            }),
            Err(e) => Err(e.into()),
        }
    }
}
