use devcamper_core::axum::extract::{Path, State};
use devcamper_core::axum::routing::get;
use devcamper_core::axum::Router;
use devcamper_core::{AppError, ValidJson};
use devcamper_data::document::parse_id;
use devcamper_data::{AdvancedResults, DocumentStore, Envelope, Filter, FindQuery, Populate, QueryParams};
use devcamper_security::authorize;
use serde_json::{json, Value};

use super::{listing, of_bootcamp, refresh_averages, success, JsonResult};
use crate::auth::CurrentUser;
use crate::models::{to_fields, Bootcamp, Course, CourseUpdate, NewCourse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_courses))
        .route("/{id}", get(get_course).put(update_course).delete(delete_course))
}

fn bootcamp_summary() -> Populate {
    Populate::path("bootcamp").select(["name", "description"])
}

fn not_found(id: &str) -> AppError {
    AppError::not_found(format!("No course with the id of {id}"))
}

async fn load(state: &AppState, id: &str) -> Result<Value, AppError> {
    state
        .store
        .find_by_id::<Course>(id)
        .await?
        .ok_or_else(|| not_found(id))
}

fn bootcamp_of(course: &Value) -> Option<&str> {
    course.get("bootcamp").and_then(Value::as_str)
}

/// GET /api/v1/courses
pub async fn get_courses(State(state): State<AppState>, params: QueryParams) -> Result<Envelope, AppError> {
    let pipeline = AdvancedResults::<Course>::new().populate(bootcamp_summary());
    Ok(pipeline.run(&state.store, &params).await?)
}

/// GET /api/v1/bootcamps/{id}/courses
pub async fn get_bootcamp_courses(State(state): State<AppState>, Path(bootcamp_id): Path<String>) -> JsonResult {
    Ok(listing(of_bootcamp::<Course>(&state.store, &bootcamp_id).await?))
}

/// GET /api/v1/courses/{id}
pub async fn get_course(State(state): State<AppState>, Path(id): Path<String>) -> JsonResult {
    let query = FindQuery::new::<Course>()
        .filter(Filter::by_id(parse_id(&id)?))
        .populate(bootcamp_summary());
    let course = state.store.find_one(query).await?.ok_or_else(|| not_found(&id))?;
    Ok(success(course))
}

/// POST /api/v1/bootcamps/{id}/courses
pub async fn add_course(
    State(state): State<AppState>,
    Path(bootcamp_id): Path<String>,
    user: CurrentUser,
    ValidJson(body): ValidJson<NewCourse>,
) -> JsonResult {
    authorize(&user, &["publisher", "admin"])?;
    let bootcamp = state
        .store
        .find_by_id::<Bootcamp>(&bootcamp_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No bootcamp with the id of {bootcamp_id}")))?;
    if !user.may_modify(&bootcamp) {
        return Err(AppError::Unauthorized(format!(
            "User {} is not authorized to add a course to bootcamp {bootcamp_id}",
            user.id
        )));
    }

    let mut fields = to_fields(&body)?;
    fields.insert("bootcamp".into(), Value::String(bootcamp_id.clone()));
    fields.insert("user".into(), Value::String(user.id.clone()));
    let course = state.store.insert::<Course>(fields).await?;
    refresh_averages(&state.store, &bootcamp_id).await?;

    tracing::info!(bootcamp = %bootcamp_id, title = %body.title, "course added");
    Ok(success(course))
}

/// PUT /api/v1/courses/{id}
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
    ValidJson(body): ValidJson<CourseUpdate>,
) -> JsonResult {
    authorize(&user, &["publisher", "admin"])?;
    let course = load(&state, &id).await?;
    if !user.may_modify(&course) {
        return Err(AppError::Unauthorized(format!(
            "User {} is not authorized to update course {id}",
            user.id
        )));
    }

    let updated = state
        .store
        .update::<Course>(&id, to_fields(&body)?)
        .await?
        .ok_or_else(|| not_found(&id))?;
    if let Some(bootcamp_id) = bootcamp_of(&updated) {
        refresh_averages(&state.store, bootcamp_id).await?;
    }
    Ok(success(updated))
}

/// DELETE /api/v1/courses/{id}
pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: CurrentUser,
) -> JsonResult {
    authorize(&user, &["publisher", "admin"])?;
    let course = load(&state, &id).await?;
    if !user.may_modify(&course) {
        return Err(AppError::Unauthorized(format!(
            "User {} is not authorized to delete course {id}",
            user.id
        )));
    }

    state.store.delete::<Course>(&id).await?;
    if let Some(bootcamp_id) = bootcamp_of(&course) {
        refresh_averages(&state.store, bootcamp_id).await?;
    }
    Ok(success(json!({})))
}
