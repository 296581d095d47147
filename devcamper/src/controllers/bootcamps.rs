use devcamper_core::axum::extract::{Path, State};
use devcamper_core::axum::http::StatusCode;
use devcamper_core::axum::routing::get;
use devcamper_core::axum::Router;
use devcamper_core::{AppError, ValidJson};
use devcamper_data::{AdvancedResults, DocumentStore, Envelope, Filter, FindQuery, QueryParams};
use devcamper_security::authorize;
use serde_json::{json, Value};

use super::{courses, reviews, success, CreatedResult, JsonResult};
use crate::auth::CurrentUser;
use crate::models::bootcamp::{slugify, DEFAULT_PHOTO};
use crate::models::{to_fields, Bootcamp, BootcampUpdate, Course, NewBootcamp, Review};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_bootcamps).post(create_bootcamp))
        .route("/{id}", get(get_bootcamp).put(update_bootcamp).delete(delete_bootcamp))
        .route("/{id}/courses", get(courses::get_bootcamp_courses).post(courses::add_course))
        .route("/{id}/reviews", get(reviews::get_bootcamp_reviews).post(reviews::add_review))
}

fn not_found(id: &str) -> AppError {
    AppError::not_found(format!("Bootcamp not found with id of {id}"))
}

async fn load(state: &AppState, id: &str) -> Result<Value, AppError> {
    state
        .store
        .find_by_id::<Bootcamp>(id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// GET /api/v1/bootcamps
pub async fn get_bootcamps(State(state): State<AppState>, params: QueryParams) -> Result<Envelope, AppError> {
    let pipeline = AdvancedResults::<Bootcamp>::new().populate("courses");
    Ok(pipeline.run(&state.store, &params).await?)
}

/// GET /api/v1/bootcamps/{id}
pub async fn get_bootcamp(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    Ok(success(load(&state, &id).await?))
}

/// POST /api/v1/bootcamps
pub async fn create_bootcamp(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(body): ValidJson<NewBootcamp>,
) -> CreatedResult {
    authorize(&user, &["publisher", "admin"])?;

    if !user.is_admin() {
        let published = FindQuery::new::<Bootcamp>().filter(Filter::eq("user", &user.id));
        if state.store.find_one(published).await?.is_some() {
            return Err(AppError::bad_request(format!(
                "The user with ID {} has already published a bootcamp",
                user.id
            )));
        }
    }

    let mut fields = to_fields(&body)?;
    fields.insert("slug".into(), Value::String(slugify(&body.name)));
    fields.insert("photo".into(), Value::String(DEFAULT_PHOTO.into()));
    fields.insert("user".into(), Value::String(user.id.clone()));
    let bootcamp = state.store.insert::<Bootcamp>(fields).await?;

    tracing::info!(name = %body.name, user = %user.id, "bootcamp created");
    Ok((StatusCode::CREATED, success(bootcamp)))
}

/// PUT /api/v1/bootcamps/{id}
pub async fn update_bootcamp(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
    ValidJson(body): ValidJson<BootcampUpdate>,
) -> JsonResult {
    authorize(&user, &["publisher", "admin"])?;
    let bootcamp = load(&state, &id).await?;
    if !user.may_modify(&bootcamp) {
        return Err(AppError::Unauthorized(format!(
            "User {} is not authorized to update this bootcamp",
            user.id
        )));
    }

    let mut changes = to_fields(&body)?;
    if let Some(name) = &body.name {
        changes.insert("slug".into(), Value::String(slugify(name)));
    }
    let updated = state
        .store
        .update::<Bootcamp>(&id, changes)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(success(updated))
}

/// DELETE /api/v1/bootcamps/{id}
///
/// Removes the bootcamp's courses and reviews with it.
pub async fn delete_bootcamp(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
) -> JsonResult {
    authorize(&user, &["publisher", "admin"])?;
    let bootcamp = load(&state, &id).await?;
    if !user.may_modify(&bootcamp) {
        return Err(AppError::Unauthorized(format!(
            "User {} is not authorized to delete this bootcamp",
            user.id
        )));
    }

    let owned = Filter::eq("bootcamp", &id);
    let courses = state.store.delete_many::<Course>(&owned).await?;
    let reviews = state.store.delete_many::<Review>(&owned).await?;
    state.store.delete::<Bootcamp>(&id).await?;

    tracing::info!(bootcamp = %id, courses, reviews, "bootcamp deleted");
    Ok(success(json!({})))
}
