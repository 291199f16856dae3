// src/core/database.rs
//! SQLite-backed document store - one row per document, JSON body

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, info};

use crate::core::store::{
    matches_all, split_doc_path, validate_collection_path, Document, DocumentStore, Fields, Filter,
};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file and run migrations
    pub async fn open(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("Failed to create database directory")?;
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!("Database connection established: {}", database_path.display());

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database; a single connection keeps it alive
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                path TEXT PRIMARY KEY,
                collection TEXT NOT NULL,
                doc_id TEXT NOT NULL,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);")
            .execute(&self.pool)
            .await?;

        info!("Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

fn parse_body(path: &str, raw: &str) -> Result<Fields> {
    serde_json::from_str(raw).with_context(|| format!("Corrupt document body at {}", path))
}

#[rocket::async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, path: &str) -> Result<Option<Document>> {
        split_doc_path(path)?;

        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM documents WHERE path = ?")
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read document: {}", path))?;

        row.map(|(raw,)| Ok(Document::new(path, parse_body(path, &raw)?)))
            .transpose()
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>> {
        validate_collection_path(collection)?;

        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT path, data
            FROM documents
            WHERE collection = ?
            ORDER BY path ASC
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to query collection: {}", collection))?;

        let mut docs = Vec::with_capacity(rows.len());
        for (path, raw) in rows {
            let data = parse_body(&path, &raw)?;
            if matches_all(filters, &data) {
                docs.push(Document::new(&path, data));
            }
        }
        debug!("Query {} returned {} documents", collection, docs.len());
        Ok(docs)
    }

    async fn set(&self, path: &str, data: Fields) -> Result<()> {
        let (collection, doc_id) = split_doc_path(path)?;
        let body = serde_json::to_string(&data)?;

        sqlx::query(
            r#"
            INSERT INTO documents (path, collection, doc_id, data, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(path) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
            "#,
        )
        .bind(path)
        .bind(collection)
        .bind(doc_id)
        .bind(body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write document: {}", path))?;

        Ok(())
    }

    async fn update(&self, path: &str, patch: Fields) -> Result<()> {
        split_doc_path(path)?;
        let mut tx = self.pool.begin().await?;

        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM documents WHERE path = ?")
            .bind(path)
            .fetch_optional(&mut *tx)
            .await?;

        let Some((raw,)) = row else {
            tx.rollback().await?;
            anyhow::bail!("Document not found: {}", path);
        };

        let mut data = parse_body(path, &raw)?;
        data.extend(patch);

        sqlx::query("UPDATE documents SET data = ?, updated_at = ? WHERE path = ?")
            .bind(serde_json::to_string(&data)?)
            .bind(Utc::now())
            .bind(path)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to update document: {}", path))?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        split_doc_path(path)?;
        sqlx::query("DELETE FROM documents WHERE path = ?")
            .bind(path)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete document: {}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_sqlite_store_crud_and_filters() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.health_check().await.unwrap();

        store
            .set("jobs/j1", fields(json!({"isDeleted": true, "scheduledForDeletion": 10})))
            .await
            .unwrap();
        store
            .set("jobs/j2", fields(json!({"isDeleted": false})))
            .await
            .unwrap();
        store
            .set("jobs/j1/applicants/a1", fields(json!({"status": "Pending"})))
            .await
            .unwrap();

        let trashed = store
            .query(
                "jobs",
                &[Filter::eq("isDeleted", true), Filter::lte("scheduledForDeletion", 10)],
            )
            .await
            .unwrap();
        assert_eq!(trashed.len(), 1);
        assert_eq!(trashed[0].id, "j1");

        store
            .update("jobs/j2", fields(json!({"title": "Registrar"})))
            .await
            .unwrap();
        let j2 = store.get("jobs/j2").await.unwrap().unwrap();
        assert_eq!(j2.data["title"], json!("Registrar"));
        assert_eq!(j2.data["isDeleted"], json!(false));

        assert!(store.update("jobs/nope", Fields::new()).await.is_err());

        store.delete("jobs/j1").await.unwrap();
        assert!(store.get("jobs/j1").await.unwrap().is_none());
        assert_eq!(store.list("jobs/j1/applicants").await.unwrap().len(), 1);
    }
}
