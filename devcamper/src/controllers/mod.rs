pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod users;

use devcamper_core::axum::http::StatusCode;
use devcamper_core::axum::Json;
use devcamper_core::AppError;
use devcamper_data::document::parse_id;
use devcamper_data::{Document, DocumentStore, Filter, FindQuery};
use serde_json::{json, Map, Value};

use crate::models::{course, review, Bootcamp, Course, Review};
use crate::store::Store;

pub type JsonResult = Result<Json<Value>, AppError>;
pub type CreatedResult = Result<(StatusCode, Json<Value>), AppError>;

/// `{"success": true, "data": data}`.
pub fn success(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Unpaginated list: `{"success": true, "count": n, "data": [...]}`.
pub fn listing(data: Vec<Value>) -> Json<Value> {
    Json(json!({ "success": true, "count": data.len(), "data": data }))
}

/// Every document of `M` whose `bootcamp` field is `bootcamp_id`, oldest first.
/// A malformed id is a 404, like any other bad id.
pub async fn of_bootcamp<M: Document>(store: &Store, bootcamp_id: &str) -> Result<Vec<Value>, AppError> {
    let query = FindQuery::new::<M>().filter(Filter::eq("bootcamp", parse_id(bootcamp_id)?));
    Ok(store.find(&query).await?)
}

/// Recompute the derived `averageCost` and `averageRating` of one bootcamp.
/// A bootcamp that is already gone is skipped.
pub async fn refresh_averages(store: &Store, bootcamp_id: &str) -> Result<(), AppError> {
    let courses = of_bootcamp::<Course>(store, bootcamp_id).await?;
    let reviews = of_bootcamp::<Review>(store, bootcamp_id).await?;
    let mut changes = Map::new();
    changes.insert("averageCost".into(), course::average_cost(&courses));
    changes.insert("averageRating".into(), review::average_rating(&reviews));
    let updated = store.update::<Bootcamp>(bootcamp_id, changes).await?;
    tracing::debug!(bootcamp = bootcamp_id, found = updated.is_some(), "averages refreshed");
    Ok(())
}
