//! Account administration. Every route requires the `admin` role.

use devcamper_core::axum::extract::{Path, State};
use devcamper_core::axum::http::StatusCode;
use devcamper_core::axum::routing::get;
use devcamper_core::axum::Router;
use devcamper_core::{AppError, ValidJson};
use devcamper_data::{AdvancedResults, DocumentStore, Envelope, QueryParams};
use devcamper_security::authorize;
use serde_json::json;

use super::{auth, success, CreatedResult, JsonResult};
use crate::auth::CurrentUser;
use crate::models::{to_fields, NewUser, User, UserUpdate};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}

fn not_found(id: &str) -> AppError {
    AppError::not_found(format!("No user with the id of {id}"))
}

/// GET /api/v1/users
pub async fn get_users(
    State(state): State<AppState>,
    admin: CurrentUser,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    authorize(&admin, &["admin"])?;
    Ok(AdvancedResults::<User>::new().run(&state.store, &params).await?)
}

/// GET /api/v1/users/{id}
pub async fn get_user(State(state): State<AppState>, admin: CurrentUser, Path(id): Path<String>) -> JsonResult {
    authorize(&admin, &["admin"])?;
    let user = state
        .store
        .find_by_id::<User>(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(success(user))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    admin: CurrentUser,
    ValidJson(body): ValidJson<NewUser>,
) -> CreatedResult {
    authorize(&admin, &["admin"])?;
    let user = auth::create_user(&state, &body).await?;
    tracing::info!(email = %body.email, role = body.role.as_str(), by = %admin.id, "user created");
    Ok((StatusCode::CREATED, success(user)))
}

/// PUT /api/v1/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<UserUpdate>,
) -> JsonResult {
    authorize(&admin, &["admin"])?;
    let user = state
        .store
        .update::<User>(&id, to_fields(&body)?)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(success(user))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(State(state): State<AppState>, admin: CurrentUser, Path(id): Path<String>) -> JsonResult {
    authorize(&admin, &["admin"])?;
    if !state.store.delete::<User>(&id).await? {
        return Err(not_found(&id));
    }
    tracing::info!(user = %id, by = %admin.id, "user deleted");
    Ok(success(json!({})))
}
