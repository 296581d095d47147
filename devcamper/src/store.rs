use devcamper_data::{DataError, Document, DocumentStore, Filter, FindQuery, MemoryStore};
#[cfg(feature = "sqlite")]
use devcamper_data::SqliteStore;
use serde_json::{Map, Value};

use crate::config::{AppConfig, StoreBackend};

/// The backend selected by `store.backend`.
#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteStore),
}

impl Store {
    pub async fn connect(config: &AppConfig) -> Result<Self, DataError> {
        match config.store_backend {
            StoreBackend::Memory => {
                tracing::info!("using in-memory document store");
                Ok(Store::Memory(MemoryStore::new()))
            }
            #[cfg(feature = "sqlite")]
            StoreBackend::Sqlite => Ok(Store::Sqlite(SqliteStore::connect(&config.store_url).await?)),
            #[cfg(not(feature = "sqlite"))]
            StoreBackend::Sqlite => Err(DataError::Other(
                "store.backend is sqlite but the sqlite feature is disabled".into(),
            )),
        }
    }

    pub fn memory() -> Self {
        Store::Memory(MemoryStore::new())
    }
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            Store::Memory($store) => $call,
            #[cfg(feature = "sqlite")]
            Store::Sqlite($store) => $call,
        }
    };
}

impl DocumentStore for Store {
    async fn find(&self, query: &FindQuery) -> Result<Vec<Value>, DataError> {
        dispatch!(self, store => store.find(query).await)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DataError> {
        dispatch!(self, store => store.count(collection, filter).await)
    }

    async fn insert<M: Document>(&self, doc: Map<String, Value>) -> Result<Value, DataError> {
        dispatch!(self, store => store.insert::<M>(doc).await)
    }

    async fn update<M: Document>(&self, id: &str, changes: Map<String, Value>) -> Result<Option<Value>, DataError> {
        dispatch!(self, store => store.update::<M>(id, changes).await)
    }

    async fn delete<M: Document>(&self, id: &str) -> Result<bool, DataError> {
        dispatch!(self, store => store.delete::<M>(id).await)
    }

    async fn delete_many<M: Document>(&self, filter: &Filter) -> Result<u64, DataError> {
        dispatch!(self, store => store.delete_many::<M>(filter).await)
    }
}
