//! The authenticated caller of a protected route.

use devcamper_core::axum::extract::FromRequestParts;
use devcamper_core::axum::http::request::Parts;
use devcamper_core::AppError;
use devcamper_data::{DataError, DocumentStore};
use devcamper_security::{extract_claims, RoleBasedIdentity};
use serde_json::Value;

use crate::models::{owner_of, User};
use crate::state::AppState;

/// The user named by a valid bearer token, loaded from the store.
///
/// A token for a user that no longer exists is rejected like a bad token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub role: String,
    pub doc: Value,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// True when `doc` belongs to this user or the user is an admin.
    pub fn may_modify(&self, doc: &Value) -> bool {
        self.is_admin() || owner_of(doc) == Some(self.id.as_str())
    }
}

impl RoleBasedIdentity for CurrentUser {
    fn role(&self) -> &str {
        &self.role
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = extract_claims(parts, state)?;
        let doc = match state.store.find_by_id::<User>(&claims.id).await {
            Ok(Some(doc)) => doc,
            Ok(None) | Err(DataError::InvalidId(_)) => {
                tracing::warn!(id = %claims.id, "token names an unknown user");
                return Err(AppError::not_authorized());
            }
            Err(e) => return Err(e.into()),
        };
        let role = doc
            .get("role")
            .and_then(Value::as_str)
            .unwrap_or("user")
            .to_string();
        Ok(CurrentUser {
            id: claims.id,
            role,
            doc,
        })
    }
}
