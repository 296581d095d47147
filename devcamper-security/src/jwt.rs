use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SecurityConfig;
use crate::error::SecurityError;

/// Claims carried by an access token. `id` is the user's document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates HMAC-signed access tokens.
///
/// # Example
///
/// ```ignore
/// let jwt = JwtService::new(SecurityConfig::new(secret));
/// let token = jwt.sign(user_id)?;
/// let claims = jwt.validate(&token)?;
/// assert_eq!(claims.id, user_id);
/// ```
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    config: SecurityConfig,
}

impl JwtService {
    pub fn new(config: SecurityConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            config,
        }
    }

    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    /// Sign a token for `user_id` that expires after the configured number of days.
    pub fn sign(&self, user_id: &str) -> Result<String, SecurityError> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id.to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.config.expire_days)).timestamp(),
        };
        encode(&Header::new(self.config.algorithm), &claims, &self.encoding)
            .map_err(|e| SecurityError::Crypto(format!("Failed to sign token: {e}")))
    }

    /// Verify signature, issuer and expiry, and return the claims.
    pub fn validate(&self, token: &str) -> Result<Claims, SecurityError> {
        let mut validation = Validation::new(self.config.algorithm);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            let err = match e.kind() {
                ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
                ErrorKind::InvalidIssuer => SecurityError::ClaimRejected("Invalid issuer".into()),
                _ => SecurityError::Malformed(e.to_string()),
            };
            warn!(error = %err, "JWT validation failed");
            err
        })?;

        debug!(id = %data.claims.id, "JWT validated");
        Ok(data.claims)
    }
}
