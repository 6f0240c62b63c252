/// SQLite database setup for the admin backend
///
/// Opens the connection pool and creates the schema:
/// - projects, technologies, types: core records and reference data
/// - project_technology: many-to-many join rows
/// - leads: notification artifacts created alongside new projects

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;

/// How long a writer waits for the database lock before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Reference categories seeded on first start
const SEED_TYPES: &[&str] = &["Front-end", "Back-end", "Full-stack"];

/// Reference technologies seeded on first start
const SEED_TECHNOLOGIES: &[&str] = &[
    "HTML", "CSS", "JavaScript", "PHP", "Laravel", "Vue", "MySQL", "Rust",
];

/// Connection pool plus schema management
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database file at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("Failed to create database directory '{}': {}", parent.display(), e)
            })?;
        }

        tracing::info!("🗄️ Opening database: {}", db_path.display());

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePool::connect_with(options).await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Private in-memory database, used by tests and throwaway runs
    ///
    /// Pinned to a single connection: every sqlite `:memory:` connection is a
    /// separate database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Shared connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes, then seed reference data
    ///
    /// Safe to call multiple times (IF NOT EXISTS / INSERT OR IGNORE).
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS types (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS technologies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                slug TEXT NOT NULL,
                content TEXT,
                cover_image TEXT,
                type_id INTEGER REFERENCES types(id) ON DELETE SET NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS project_technology (
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                technology_id INTEGER NOT NULL REFERENCES technologies(id) ON DELETE CASCADE,
                PRIMARY KEY (project_id, technology_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS leads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT,
                slug TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_projects_slug ON projects(slug)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_project_technology_tech ON project_technology(technology_id)",
        )
        .execute(&self.pool)
        .await?;

        for name in SEED_TYPES {
            sqlx::query("INSERT OR IGNORE INTO types (name) VALUES (?)")
                .bind(name)
                .execute(&self.pool)
                .await?;
        }

        for name in SEED_TECHNOLOGIES {
            sqlx::query("INSERT OR IGNORE INTO technologies (name) VALUES (?)")
                .bind(name)
                .execute(&self.pool)
                .await?;
        }

        tracing::debug!(
            "📋 Schema ready ({} types, {} technologies seeded)",
            SEED_TYPES.len(),
            SEED_TECHNOLOGIES.len()
        );

        Ok(())
    }
}
