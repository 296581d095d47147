use devcamper_core::axum::extract::{Path, State};
use devcamper_core::axum::http::StatusCode;
use devcamper_core::axum::routing::get;
use devcamper_core::axum::Router;
use devcamper_core::{AppError, ValidJson};
use devcamper_data::document::parse_id;
use devcamper_data::{
    AdvancedResults, DataError, DocumentStore, Envelope, Filter, FindQuery, Populate, QueryParams,
};
use devcamper_security::authorize;
use serde_json::{json, Value};

use super::{listing, of_bootcamp, refresh_averages, success, CreatedResult, JsonResult};
use crate::auth::CurrentUser;
use crate::models::{to_fields, Bootcamp, NewReview, Review, ReviewUpdate};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_reviews))
        .route("/{id}", get(get_review).put(update_review).delete(delete_review))
}

fn bootcamp_summary() -> Populate {
    Populate::path("bootcamp").select(["name", "description"])
}

fn not_found(id: &str) -> AppError {
    AppError::not_found(format!("No review found with the id of {id}"))
}

async fn load(state: &AppState, id: &str) -> Result<Value, AppError> {
    state
        .store
        .find_by_id::<Review>(id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// GET /api/v1/reviews
pub async fn get_reviews(State(state): State<AppState>, params: QueryParams) -> Result<Envelope, AppError> {
    let pipeline = AdvancedResults::<Review>::new().populate(bootcamp_summary());
    Ok(pipeline.run(&state.store, &params).await?)
}

/// GET /api/v1/bootcamps/{id}/reviews
pub async fn get_bootcamp_reviews(State(state): State<AppState>, Path(bootcamp_id): Path<String>) -> JsonResult {
    Ok(listing(of_bootcamp::<Review>(&state.store, &bootcamp_id).await?))
}

/// GET /api/v1/reviews/{id}
pub async fn get_review(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    let query = FindQuery::new::<Review>()
        .filter(Filter::by_id(parse_id(&id)?))
        .populate(bootcamp_summary());
    let review = state.store.find_one(query).await?.ok_or_else(|| not_found(&id))?;
    Ok(success(review))
}

/// POST /api/v1/bootcamps/{id}/reviews
///
/// A user may review each bootcamp once.
pub async fn add_review(
    State(state): State<AppState>,
    Path(bootcamp_id): Path<String>,
    user: CurrentUser,
    ValidJson(body): ValidJson<NewReview>,
) -> CreatedResult {
    authorize(&user, &["user", "admin"])?;
    if state.store.find_by_id::<Bootcamp>(&bootcamp_id).await?.is_none() {
        return Err(AppError::not_found(format!("No bootcamp with the id of {bootcamp_id}")));
    }

    let previous = FindQuery::new::<Review>()
        .filter(Filter::eq("bootcamp", &bootcamp_id).merge(Filter::eq("user", &user.id)));
    if state.store.find_one(previous).await?.is_some() {
        return Err(DataError::Duplicate("user".into()).into());
    }

    let mut fields = to_fields(&body)?;
    fields.insert("bootcamp".into(), Value::String(bootcamp_id.clone()));
    fields.insert("user".into(), Value::String(user.id.clone()));
    let review = state.store.insert::<Review>(fields).await?;
    refresh_averages(&state.store, &bootcamp_id).await?;

    tracing::info!(bootcamp = %bootcamp_id, user = %user.id, rating = body.rating, "review added");
    Ok((StatusCode::CREATED, success(review)))
}

/// PUT /api/v1/reviews/{id}
pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
    ValidJson(body): ValidJson<ReviewUpdate>,
) -> JsonResult {
    authorize(&user, &["user", "admin"])?;
    let review = load(&state, &id).await?;
    if !user.may_modify(&review) {
        return Err(AppError::Unauthorized("Not authorized to update review".into()));
    }

    let updated = state
        .store
        .update::<Review>(&id, to_fields(&body)?)
        .await?
        .ok_or_else(|| not_found(&id))?;
    if let Some(bootcamp_id) = updated.get("bootcamp").and_then(Value::as_str) {
        refresh_averages(&state.store, bootcamp_id).await?;
    }
    Ok(success(updated))
}

/// DELETE /api/v1/reviews/{id}
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
) -> JsonResult {
    authorize(&user, &["user", "admin"])?;
    let review = load(&state, &id).await?;
    if !user.may_modify(&review) {
        return Err(AppError::Unauthorized("Not authorized to delete review".into()));
    }

    state.store.delete::<Review>(&id).await?;
    if let Some(bootcamp_id) = review.get("bootcamp").and_then(Value::as_str) {
        refresh_averages(&state.store, bootcamp_id).await?;
    }
    Ok(success(json!({})))
}
