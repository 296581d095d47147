//! SQLite-backed [`DocumentStore`].
//!
//! Documents are stored as JSON text in one table keyed by collection and
//! id. Queries load the collections they touch and are evaluated in-process
//! with the same rules as [`MemoryStore`](crate::MemoryStore), so both
//! backends answer every query identically.

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};

use crate::document::{id_of, parse_id, Document, CREATED_AT_FIELD};
use crate::error::DataError;
use crate::eval;
use crate::filter::Filter;
use crate::memory::run_find;
use crate::query::FindQuery;
use crate::store::DocumentStore;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (collection, id)
)";

/// Extension trait for converting `sqlx::Error` into `DataError`.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match &self {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => DataError::Duplicate("_id".into()),
            _ => DataError::database(self),
        }
    }
}

pub type SqlxResult<T> = Result<T, DataError>;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and ensure the schema.
    ///
    /// In-memory URLs are pinned to a single long-lived connection, since
    /// each SQLite connection would otherwise see its own empty database.
    pub async fn connect(url: &str) -> SqlxResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(SqlxErrorExt::into_data_error)?
            .create_if_missing(true);
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        let store = Self::from_pool(pool);
        store.migrate().await?;
        tracing::info!(url, "sqlite document store ready");
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> SqlxResult<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        Ok(())
    }

    async fn load<'e, E>(executor: E, collection: &str) -> SqlxResult<Vec<Value>>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let bodies: Vec<String> = sqlx::query_scalar("SELECT body FROM documents WHERE collection = ? ORDER BY rowid")
            .bind(collection)
            .fetch_all(executor)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(DataError::from))
            .collect()
    }
}

impl DocumentStore for SqliteStore {
    async fn find(&self, query: &FindQuery) -> Result<Vec<Value>, DataError> {
        let mut collections = HashMap::new();
        collections.insert(
            query.collection().to_string(),
            Self::load(&self.pool, query.collection()).await?,
        );
        for (relation, _) in query.resolve_populates()? {
            if !collections.contains_key(relation.collection) {
                let related = Self::load(&self.pool, relation.collection).await?;
                collections.insert(relation.collection.to_string(), related);
            }
        }
        run_find(&collections, query)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DataError> {
        let docs = Self::load(&self.pool, collection).await?;
        Ok(docs.iter().filter(|doc| eval::matches(doc, filter)).count() as u64)
    }

    async fn insert<M: Document>(&self, doc: Map<String, Value>) -> Result<Value, DataError> {
        let doc = eval::prepare_insert(doc)?;
        let mut tx = self.pool.begin().await.map_err(SqlxErrorExt::into_data_error)?;

        let existing = Self::load(&mut *tx, M::collection()).await?;
        eval::check_unique(&existing, &doc, M::unique_fields())?;

        let id = id_of(&doc).unwrap_or_default().to_string();
        let created_at = doc
            .get(CREATED_AT_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        sqlx::query("INSERT INTO documents (collection, id, created_at, body) VALUES (?, ?, ?, ?)")
            .bind(M::collection())
            .bind(&id)
            .bind(created_at)
            .bind(doc.to_string())
            .execute(&mut *tx)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        tx.commit().await.map_err(SqlxErrorExt::into_data_error)?;

        let mut out = doc;
        eval::strip_hidden(&mut out, M::hidden_fields());
        Ok(out)
    }

    async fn update<M: Document>(&self, id: &str, changes: Map<String, Value>) -> Result<Option<Value>, DataError> {
        let id = parse_id(id)?;
        let mut tx = self.pool.begin().await.map_err(SqlxErrorExt::into_data_error)?;

        let existing = Self::load(&mut *tx, M::collection()).await?;
        let Some(current) = existing.iter().find(|doc| id_of(doc) == Some(id)) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        eval::apply_changes(&mut updated, changes);
        eval::check_unique(&existing, &updated, M::unique_fields())?;

        sqlx::query("UPDATE documents SET body = ? WHERE collection = ? AND id = ?")
            .bind(updated.to_string())
            .bind(M::collection())
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        tx.commit().await.map_err(SqlxErrorExt::into_data_error)?;

        eval::strip_hidden(&mut updated, M::hidden_fields());
        Ok(Some(updated))
    }

    async fn delete<M: Document>(&self, id: &str) -> Result<bool, DataError> {
        let id = parse_id(id)?;
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(M::collection())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many<M: Document>(&self, filter: &Filter) -> Result<u64, DataError> {
        let mut tx = self.pool.begin().await.map_err(SqlxErrorExt::into_data_error)?;
        let existing = Self::load(&mut *tx, M::collection()).await?;
        let mut removed = 0;
        for id in existing
            .iter()
            .filter(|doc| eval::matches(doc, filter))
            .filter_map(id_of)
        {
            let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
                .bind(M::collection())
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
            removed += result.rows_affected();
        }
        tx.commit().await.map_err(SqlxErrorExt::into_data_error)?;
        Ok(removed)
    }
}
