use std::sync::Arc;

use devcamper_core::axum::extract::{FromRef, FromRequestParts};
use devcamper_core::axum::http::header::AUTHORIZATION;
use devcamper_core::axum::http::request::Parts;
use devcamper_core::AppError;
use tracing::{debug, warn};

use crate::error::SecurityError;
use crate::jwt::{Claims, JwtService};

/// Extract a Bearer token from the Authorization header value.
fn parse_bearer(header_value: &str) -> Result<&str, SecurityError> {
    let mut parts = header_value.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(SecurityError::NotBearer);
    }
    match parts.next().map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(SecurityError::MissingToken),
    }
}

/// The raw bearer token of a request, without validation.
pub fn bearer_token(parts: &Parts) -> Result<&str, SecurityError> {
    let header = parts.headers.get(AUTHORIZATION).ok_or_else(|| {
        debug!(uri = %parts.uri, "Missing Authorization header");
        SecurityError::MissingToken
    })?;
    let value = header.to_str().map_err(|_| SecurityError::NotBearer)?;
    parse_bearer(value)
}

/// Extract and validate the token claims of a request.
///
/// Building a full user from the claims (a store lookup, say) is left to
/// the application's own extractor, which calls this first.
pub fn extract_claims<S>(parts: &Parts, state: &S) -> Result<Claims, AppError>
where
    Arc<JwtService>: FromRef<S>,
{
    let token = bearer_token(parts)?;
    let jwt: Arc<JwtService> = Arc::from_ref(state);
    let claims = jwt.validate(token).map_err(|e| {
        warn!(uri = %parts.uri, error = %e, "Rejected bearer token");
        AppError::from(e)
    })?;
    Ok(claims)
}

/// Validated token claims as a handler argument.
#[derive(Debug, Clone)]
pub struct BearerClaims(pub Claims);

impl<S> FromRequestParts<S> for BearerClaims
where
    S: Send + Sync,
    Arc<JwtService>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        extract_claims(parts, state).map(BearerClaims)
    }
}
