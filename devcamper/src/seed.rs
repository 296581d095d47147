//! Sample data import and removal, used by the `seeder` binary.
//!
//! The data directory holds `users.json`, `bootcamps.json`, `courses.json`
//! and `reviews.json`, each an array of documents. Documents carry their own
//! `_id` so references between the files resolve.

use std::path::Path;

use devcamper_core::AppError;
use devcamper_data::{Document, DocumentStore, Filter};
use devcamper_security::hash_password;
use serde_json::{Map, Value};

use crate::controllers::refresh_averages;
use crate::models::{Bootcamp, Course, Review, User};
use crate::store::Store;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedData {
    pub users: Vec<Map<String, Value>>,
    pub bootcamps: Vec<Map<String, Value>>,
    pub courses: Vec<Map<String, Value>>,
    pub reviews: Vec<Map<String, Value>>,
}

/// Documents written or removed, per collection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: u64,
    pub bootcamps: u64,
    pub courses: u64,
    pub reviews: u64,
}

async fn read_collection(dir: &Path, name: &str) -> Result<Vec<Map<String, Value>>, AppError> {
    let path = dir.join(format!("{name}.json"));
    let raw = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::internal(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_slice(&raw).map_err(|e| AppError::internal(format!("invalid {}: {e}", path.display())))
}

impl SeedData {
    pub async fn load(dir: &Path) -> Result<Self, AppError> {
        Ok(SeedData {
            users: read_collection(dir, User::collection()).await?,
            bootcamps: read_collection(dir, Bootcamp::collection()).await?,
            courses: read_collection(dir, Course::collection()).await?,
            reviews: read_collection(dir, Review::collection()).await?,
        })
    }
}

async fn insert_all<M: Document>(store: &Store, docs: Vec<Map<String, Value>>) -> Result<u64, AppError> {
    let mut inserted = 0;
    for doc in docs {
        store.insert::<M>(doc).await?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Insert the data set in dependency order, then derive bootcamp averages.
/// Plain-text `password` fields are hashed on the way in.
pub async fn import(store: &Store, data: SeedData) -> Result<SeedSummary, AppError> {
    let mut users = Vec::with_capacity(data.users.len());
    for mut user in data.users {
        if let Some(Value::String(plain)) = user.get("password") {
            let hash = hash_password(plain).await?;
            user.insert("password".into(), Value::String(hash));
        }
        users.push(user);
    }

    let bootcamp_ids: Vec<String> = data
        .bootcamps
        .iter()
        .filter_map(|b| b.get("_id").and_then(Value::as_str).map(str::to_string))
        .collect();

    let summary = SeedSummary {
        users: insert_all::<User>(store, users).await?,
        bootcamps: insert_all::<Bootcamp>(store, data.bootcamps).await?,
        courses: insert_all::<Course>(store, data.courses).await?,
        reviews: insert_all::<Review>(store, data.reviews).await?,
    };
    for id in &bootcamp_ids {
        refresh_averages(store, id).await?;
    }

    tracing::info!(?summary, "data imported");
    Ok(summary)
}

/// Remove every document of every seeded collection.
pub async fn destroy(store: &Store) -> Result<SeedSummary, AppError> {
    let all = Filter::new();
    let summary = SeedSummary {
        reviews: store.delete_many::<Review>(&all).await?,
        courses: store.delete_many::<Course>(&all).await?,
        bootcamps: store.delete_many::<Bootcamp>(&all).await?,
        users: store.delete_many::<User>(&all).await?,
    };
    tracing::info!(?summary, "data destroyed");
    Ok(summary)
}
