//! SQLite database layer (embedded, no external dependencies)

use anyhow::{Context, Result};
use async_trait::async_trait;
use cafe_core::{CafeError, CafeItem, CafeItemStore, Change};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

/// Configured path that selects an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    pub async fn new(database_path: &str, max_connections: u32) -> Result<Self> {
        if database_path == IN_MEMORY {
            return Self::in_memory().await;
        }

        tracing::info!("Opening SQLite database at: {}", database_path);

        // Create parent directory if needed
        if let Some(parent) = std::path::Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        Self::from_pool(pool).await
    }

    /// Single-connection in-memory database.
    ///
    /// Each SQLite in-memory connection is its own database, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        tracing::info!("Opening in-memory SQLite database");

        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Invalid in-memory SQLite options")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        tracing::info!("SQLite connection established, running migrations...");

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database initialization complete");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cafe_items (
                id INTEGER PRIMARY KEY,
                name TEXT,
                description TEXT
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn drop_collection(&self) -> Result<()> {
        sqlx::query("DROP TABLE cafe_items")
            .execute(&*self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CafeItemStore for Database {
    async fn list(&self) -> cafe_core::Result<Vec<CafeItem>> {
        let rows: Vec<CafeItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, description FROM cafe_items ORDER BY id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn find(&self, id: i64) -> cafe_core::Result<Option<CafeItem>> {
        let row: Option<CafeItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, description FROM cafe_items WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(|r| r.into()))
    }

    async fn exists(&self, id: i64) -> cafe_core::Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT 1 FROM cafe_items WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(store_error)?;

        Ok(found.is_some())
    }

    async fn commit(&self, changes: Vec<Change>) -> cafe_core::Result<Vec<CafeItem>> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let mut saved = Vec::new();

        for change in changes {
            tracing::debug!("Applying {:?}", change);
            match change {
                Change::Added(mut item) => {
                    let result = if item.has_generated_id() {
                        sqlx::query(
                            r#"
                            INSERT INTO cafe_items (name, description) VALUES (?1, ?2)
                            "#,
                        )
                        .bind(&item.name)
                        .bind(&item.description)
                        .execute(&mut *tx)
                        .await
                    } else {
                        sqlx::query(
                            r#"
                            INSERT INTO cafe_items (id, name, description) VALUES (?1, ?2, ?3)
                            "#,
                        )
                        .bind(item.id)
                        .bind(&item.name)
                        .bind(&item.description)
                        .execute(&mut *tx)
                        .await
                    };
                    let result = result.map_err(store_error)?;

                    item.id = result.last_insert_rowid();
                    saved.push(item);
                }
                Change::Modified(item) => {
                    let result = sqlx::query(
                        r#"
                        UPDATE cafe_items SET name = ?1, description = ?2 WHERE id = ?3
                        "#,
                    )
                    .bind(&item.name)
                    .bind(&item.description)
                    .bind(item.id)
                    .execute(&mut *tx)
                    .await
                    .map_err(store_error)?;

                    if result.rows_affected() == 0 {
                        return Err(CafeError::ConcurrencyConflict { id: item.id });
                    }
                    saved.push(item);
                }
                Change::Deleted(item) => {
                    let result = sqlx::query(
                        r#"
                        DELETE FROM cafe_items WHERE id = ?1
                        "#,
                    )
                    .bind(item.id)
                    .execute(&mut *tx)
                    .await
                    .map_err(store_error)?;

                    if result.rows_affected() == 0 {
                        return Err(CafeError::ConcurrencyConflict { id: item.id });
                    }
                }
            }
        }

        // Dropping `tx` on any early return above rolls the batch back.
        tx.commit().await.map_err(store_error)?;

        Ok(saved)
    }
}

/// Maps a sqlx failure onto the store-level error kinds.
fn store_error(e: sqlx::Error) -> CafeError {
    if let sqlx::Error::Database(db) = &e {
        if db.message().starts_with("no such table") {
            return CafeError::CollectionUnavailable(db.message().to_string());
        }
    }
    CafeError::Database(e.to_string())
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct CafeItemRow {
    id: i64,
    name: Option<String>,
    description: Option<String>,
}

impl From<CafeItemRow> for CafeItem {
    fn from(r: CafeItemRow) -> Self {
        CafeItem {
            id: r.id,
            name: r.name,
            description: r.description,
        }
    }
}
