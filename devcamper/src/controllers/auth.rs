use chrono::Utc;
use devcamper_core::axum::extract::{Path, State};
use devcamper_core::axum::http::header::{HOST, SET_COOKIE};
use devcamper_core::axum::http::{HeaderMap, StatusCode};
use devcamper_core::axum::response::{IntoResponse, Response};
use devcamper_core::axum::routing::{get, post, put};
use devcamper_core::axum::{Json, Router};
use devcamper_core::{AppError, ValidJson};
use devcamper_data::document::id_of;
use devcamper_data::{DocumentStore, Filter, FilterTerm, FindQuery, Operand, Operator};
use devcamper_security::{digest_reset_token, hash_password, verify_password, ResetToken};
use garde::Validate;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{success, JsonResult};
use crate::auth::CurrentUser;
use crate::mailer::MailMessage;
use crate::models::{to_fields, NewUser, Register, User};
use crate::state::AppState;

/// Reset tokens stay valid this long.
const RESET_TOKEN_TTL_MS: i64 = 10 * 60 * 1000;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/me", get(get_me))
        .route("/updatedetails", put(update_details))
        .route("/updatepassword", put(update_password))
        .route("/forgotpassword", post(forgot_password))
        .route("/resetpassword/{token}", put(reset_password))
}

#[derive(Debug, Deserialize, Validate)]
pub struct Login {
    #[serde(default)]
    #[garde(skip)]
    pub email: Option<String>,
    #[serde(default)]
    #[garde(skip)]
    pub password: Option<String>,
}

#[derive(Debug, serde::Serialize, Deserialize, Validate)]
pub struct UpdateDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(email)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePassword {
    #[garde(length(min = 1))]
    pub current_password: String,
    #[garde(length(min = 6))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPassword {
    #[garde(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPassword {
    #[garde(length(min = 6))]
    pub password: String,
}

/// `token=<jwt>; Path=/; Max-Age=<seconds>; HttpOnly[; Secure]`.
fn token_cookie(value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!("token={value}; Path=/; Max-Age={max_age_secs}; HttpOnly");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Sign a token for `user`, set it as a cookie and return `{success, token}`.
fn send_token_response(state: &AppState, user: &Value, status: StatusCode) -> Result<Response, AppError> {
    let id = id_of(user).ok_or_else(|| AppError::internal("stored user has no id"))?;
    let token = state.jwt.sign(id)?;
    let cookie = token_cookie(
        &token,
        state.config.jwt_expire_days * 24 * 60 * 60,
        state.config.secure_cookies,
    );
    Ok((status, [(SET_COOKIE, cookie)], Json(json!({ "success": true, "token": token }))).into_response())
}

/// The first user matching `filter`, hidden fields included.
async fn find_with_secrets(state: &AppState, filter: Filter) -> Result<Option<Value>, AppError> {
    let query = FindQuery::new::<User>().filter(filter).reveal_hidden();
    Ok(state.store.find_one(query).await?)
}

fn password_hash(user: &Value) -> &str {
    user.get("password").and_then(Value::as_str).unwrap_or_default()
}

/// Store a new user, hashing the password first.
pub async fn create_user(state: &AppState, body: &NewUser) -> Result<Value, AppError> {
    let mut fields = to_fields(body)?;
    fields.insert("password".into(), Value::String(hash_password(&body.password).await?));
    Ok(state.store.insert::<User>(fields).await?)
}

/// POST /api/v1/auth/register
pub async fn register(State(state): State<AppState>, ValidJson(body): ValidJson<Register>) -> Result<Response, AppError> {
    let user = create_user(&state, &NewUser::from(body)).await?;
    tracing::info!(id = ?id_of(&user), "user registered");
    send_token_response(&state, &user, StatusCode::OK)
}

/// POST /api/v1/auth/login
pub async fn login(State(state): State<AppState>, ValidJson(body): ValidJson<Login>) -> Result<Response, AppError> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(AppError::bad_request("Please provide an email and password"));
    };
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let user = find_with_secrets(&state, Filter::eq("email", &email))
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&password, password_hash(&user)).await {
        tracing::debug!(email = %email, "password mismatch");
        return Err(invalid());
    }
    send_token_response(&state, &user, StatusCode::OK)
}

/// GET /api/v1/auth/logout
///
/// Overwrites the token cookie with one that expires in ten seconds.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = token_cookie("none", 10, state.config.secure_cookies);
    ([(SET_COOKIE, cookie)], success(json!({})))
}

/// GET /api/v1/auth/me
pub async fn get_me(user: CurrentUser) -> JsonResult {
    Ok(success(user.doc))
}

/// PUT /api/v1/auth/updatedetails
pub async fn update_details(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(body): ValidJson<UpdateDetails>,
) -> JsonResult {
    let updated = state
        .store
        .update::<User>(&user.id, to_fields(&body)?)
        .await?
        .ok_or_else(AppError::not_authorized)?;
    Ok(success(updated))
}

/// PUT /api/v1/auth/updatepassword
pub async fn update_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(body): ValidJson<UpdatePassword>,
) -> Result<Response, AppError> {
    let stored = find_with_secrets(&state, Filter::by_id(&user.id))
        .await?
        .ok_or_else(AppError::not_authorized)?;
    if !verify_password(&body.current_password, password_hash(&stored)).await {
        return Err(AppError::Unauthorized("Password is incorrect".into()));
    }

    let mut changes = Map::new();
    changes.insert("password".into(), Value::String(hash_password(&body.new_password).await?));
    let updated = state
        .store
        .update::<User>(&user.id, changes)
        .await?
        .ok_or_else(AppError::not_authorized)?;
    send_token_response(&state, &updated, StatusCode::OK)
}

/// POST /api/v1/auth/forgotpassword
///
/// Stores the digest of a fresh reset token and mails the raw token as a
/// link. When the mail cannot be sent the token is cleared again.
pub async fn forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(body): ValidJson<ForgotPassword>,
) -> JsonResult {
    let user = state
        .store
        .find_one(FindQuery::new::<User>().filter(Filter::eq("email", &body.email)))
        .await?
        .ok_or_else(|| AppError::not_found("There is no user with that email"))?;
    let id = id_of(&user)
        .ok_or_else(|| AppError::internal("stored user has no id"))?
        .to_string();

    let token = ResetToken::generate();
    let mut changes = Map::new();
    changes.insert("resetPasswordToken".into(), Value::String(token.digest.clone()));
    changes.insert(
        "resetPasswordExpire".into(),
        Value::from(Utc::now().timestamp_millis() + RESET_TOKEN_TTL_MS),
    );
    state.store.update::<User>(&id, changes).await?;

    let base = match &state.config.reset_url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => {
            let host = headers.get(HOST).and_then(|h| h.to_str().ok()).unwrap_or("localhost");
            format!("http://{host}")
        }
    };
    let reset_url = format!("{base}/api/v1/auth/resetpassword/{}", token.raw);
    let message = MailMessage {
        to: body.email.clone(),
        subject: "Password reset token".into(),
        body: format!(
            "You are receiving this email because you (or someone else) has requested the reset of a password. \
             Please make a PUT request to: \n\n {reset_url}"
        ),
    };

    if let Err(e) = state.mailer.send(&message) {
        tracing::error!(error = %e, user = %id, "reset mail failed");
        let mut clear = Map::new();
        clear.insert("resetPasswordToken".into(), Value::Null);
        clear.insert("resetPasswordExpire".into(), Value::Null);
        state.store.update::<User>(&id, clear).await?;
        return Err(AppError::internal("Email could not be sent"));
    }

    Ok(success(json!("Email sent")))
}

/// PUT /api/v1/auth/resetpassword/{token}
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ValidJson(body): ValidJson<ResetPassword>,
) -> Result<Response, AppError> {
    let now = Utc::now().timestamp_millis();
    let filter = Filter::eq("resetPasswordToken", digest_reset_token(&token)).and(FilterTerm::new(
        "resetPasswordExpire",
        Operator::Gt,
        Operand::Text(now.to_string()),
    ));
    let user = find_with_secrets(&state, filter)
        .await?
        .ok_or_else(|| AppError::bad_request("Invalid token"))?;
    let id = id_of(&user)
        .ok_or_else(|| AppError::internal("stored user has no id"))?
        .to_string();

    let mut changes = Map::new();
    changes.insert("password".into(), Value::String(hash_password(&body.password).await?));
    changes.insert("resetPasswordToken".into(), Value::Null);
    changes.insert("resetPasswordExpire".into(), Value::Null);
    let updated = state
        .store
        .update::<User>(&id, changes)
        .await?
        .ok_or_else(|| AppError::bad_request("Invalid token"))?;

    tracing::info!(user = %id, "password reset");
    send_token_response(&state, &updated, StatusCode::OK)
}
