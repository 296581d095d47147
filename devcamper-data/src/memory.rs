use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::document::{id_of, parse_id, Document};
use crate::error::DataError;
use crate::eval;
use crate::filter::Filter;
use crate::query::FindQuery;
use crate::store::DocumentStore;

type Collections = HashMap<String, Vec<Value>>;

/// In-process document store. Collections keep insertion order, so ties in
/// a sort resolve the same way on every run.
///
/// Cloning is cheap and clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents in `collection`, ignoring any filter.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

/// Run a query against a snapshot of every collection. Shared with the
/// SQLite store, which loads the collections it needs before calling this.
pub(crate) fn run_find(collections: &Collections, query: &FindQuery) -> Result<Vec<Value>, DataError> {
    let populates = query.resolve_populates()?;
    let mut page = match collections.get(query.collection()) {
        Some(docs) => eval::select_page(docs, query),
        None => Vec::new(),
    };

    for (relation, populate) in &populates {
        let related = collections
            .get(relation.collection)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let relation = if query.reveals_hidden() { relation.hiding(&[]) } else { *relation };
        for doc in &mut page {
            eval::expand(doc, &relation, populate, related);
        }
    }

    let hidden = query.hidden_fields();
    for doc in &mut page {
        eval::strip_hidden(doc, hidden);
    }
    Ok(page)
}

fn visible<M: Document>(doc: &Value) -> Value {
    let mut doc = doc.clone();
    eval::strip_hidden(&mut doc, M::hidden_fields());
    doc
}

impl DocumentStore for MemoryStore {
    async fn find(&self, query: &FindQuery) -> Result<Vec<Value>, DataError> {
        let collections = self.collections.read().await;
        run_find(&collections, query)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DataError> {
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map_or(0, |docs| docs.iter().filter(|doc| eval::matches(doc, filter)).count());
        Ok(count as u64)
    }

    async fn insert<M: Document>(&self, doc: Map<String, Value>) -> Result<Value, DataError> {
        let doc = eval::prepare_insert(doc)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(M::collection().to_string()).or_default();

        if docs.iter().any(|existing| id_of(existing) == id_of(&doc)) {
            return Err(DataError::Duplicate(crate::document::ID_FIELD.to_string()));
        }
        eval::check_unique(docs.iter(), &doc, M::unique_fields())?;

        let out = visible::<M>(&doc);
        docs.push(doc);
        tracing::debug!(collection = M::collection(), id = ?id_of(&out), "document inserted");
        Ok(out)
    }

    async fn update<M: Document>(&self, id: &str, changes: Map<String, Value>) -> Result<Option<Value>, DataError> {
        let id = parse_id(id)?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(M::collection()) else {
            return Ok(None);
        };
        let Some(pos) = docs.iter().position(|doc| id_of(doc) == Some(id)) else {
            return Ok(None);
        };

        let mut updated = docs[pos].clone();
        eval::apply_changes(&mut updated, changes);
        eval::check_unique(docs.iter(), &updated, M::unique_fields())?;

        let out = visible::<M>(&updated);
        docs[pos] = updated;
        Ok(Some(out))
    }

    async fn delete<M: Document>(&self, id: &str) -> Result<bool, DataError> {
        let id = parse_id(id)?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(M::collection()) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|doc| id_of(doc) != Some(id));
        Ok(docs.len() < before)
    }

    async fn delete_many<M: Document>(&self, filter: &Filter) -> Result<u64, DataError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(M::collection()) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| !eval::matches(doc, filter));
        Ok((before - docs.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct User;

    impl Document for User {
        fn collection() -> &'static str {
            "users"
        }

        fn unique_fields() -> &'static [&'static str] {
            &["email"]
        }

        fn hidden_fields() -> &'static [&'static str] {
            &["password"]
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn insert_hides_fields_and_enforces_uniqueness() {
        let store = MemoryStore::new();
        let user = store
            .insert::<User>(object(json!({"email": "a@b.c", "password": "hash"})))
            .await
            .unwrap();
        assert!(user.get("password").is_none());

        let err = store
            .insert::<User>(object(json!({"email": "a@b.c", "password": "other"})))
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Duplicate(_)));
        assert_eq!(store.len("users").await, 1);
    }

    #[tokio::test]
    async fn update_merges_top_level_fields_and_keeps_id() {
        let store = MemoryStore::new();
        let user = store
            .insert::<User>(object(json!({"email": "a@b.c", "name": "A"})))
            .await
            .unwrap();
        let id = id_of(&user).unwrap().to_string();

        let updated = store
            .update::<User>(&id, object(json!({"name": "B", "_id": "ffffffffffffffffffffffff"})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["name"], "B");
        assert_eq!(updated["email"], "a@b.c");
        assert_eq!(id_of(&updated), Some(id.as_str()));

        let missing = store
            .update::<User>("ffffffffffffffffffffffff", Map::new())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn revealing_hidden_fields_on_find() {
        let store = MemoryStore::new();
        store
            .insert::<User>(object(json!({"email": "a@b.c", "password": "hash"})))
            .await
            .unwrap();

        let query = FindQuery::new::<User>().filter(Filter::eq("email", "a@b.c"));
        let hidden = store.find_one(query.clone()).await.unwrap().unwrap();
        assert!(hidden.get("password").is_none());
        let revealed = store.find_one(query.reveal_hidden()).await.unwrap().unwrap();
        assert_eq!(revealed["password"], "hash");
    }

    #[tokio::test]
    async fn delete_and_delete_many() {
        let store = MemoryStore::new();
        let first = store.insert::<User>(object(json!({"email": "1", "role": "user"}))).await.unwrap();
        store.insert::<User>(object(json!({"email": "2", "role": "user"}))).await.unwrap();
        store.insert::<User>(object(json!({"email": "3", "role": "admin"}))).await.unwrap();

        assert!(store.delete::<User>(id_of(&first).unwrap()).await.unwrap());
        assert!(!store.delete::<User>(id_of(&first).unwrap()).await.unwrap());
        assert_eq!(store.delete_many::<User>(&Filter::eq("role", "user")).await.unwrap(), 1);
        assert_eq!(store.count("users", &Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected() {
        let store = MemoryStore::new();
        let err = store.find_by_id::<User>("not-an-id").await.unwrap_err();
        assert!(matches!(err, DataError::InvalidId(_)));
    }
}
