use std::future::Future;

use serde_json::{Map, Value};

use crate::document::{parse_id, Document};
use crate::error::DataError;
use crate::filter::Filter;
use crate::query::FindQuery;

/// Async document store contract.
///
/// Uses RPITIT (return-position `impl Trait` in traits) so implementations
/// are plain `async fn`s.
pub trait DocumentStore: Send + Sync + 'static {
    /// Run a composed query: filter, sort, skip/limit, projection, then
    /// relation expansion.
    fn find(&self, query: &FindQuery) -> impl Future<Output = Result<Vec<Value>, DataError>> + Send;

    /// Number of documents in `collection` matching `filter`.
    fn count(&self, collection: &str, filter: &Filter) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Store a new document, assigning `_id` and `createdAt` when absent.
    fn insert<M: Document>(&self, doc: Map<String, Value>) -> impl Future<Output = Result<Value, DataError>> + Send;

    /// Overwrite the given top-level fields. `None` when no document has `id`.
    fn update<M: Document>(
        &self,
        id: &str,
        changes: Map<String, Value>,
    ) -> impl Future<Output = Result<Option<Value>, DataError>> + Send;

    /// Remove one document; `false` when it did not exist.
    fn delete<M: Document>(&self, id: &str) -> impl Future<Output = Result<bool, DataError>> + Send;

    /// Remove every document of `M` matching `filter`; returns how many went.
    fn delete_many<M: Document>(&self, filter: &Filter) -> impl Future<Output = Result<u64, DataError>> + Send;

    fn find_by_id<M: Document>(&self, id: &str) -> impl Future<Output = Result<Option<Value>, DataError>> + Send {
        async move {
            let id = parse_id(id)?;
            let query = FindQuery::new::<M>().filter(Filter::by_id(id)).limit(1);
            Ok(self.find(&query).await?.into_iter().next())
        }
    }

    fn find_one(&self, query: FindQuery) -> impl Future<Output = Result<Option<Value>, DataError>> + Send {
        async move {
            let query = query.limit(1);
            Ok(self.find(&query).await?.into_iter().next())
        }
    }
}
