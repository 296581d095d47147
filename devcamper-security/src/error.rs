use std::fmt;

use devcamper_core::AppError;

/// Why a token could not be issued or accepted.
///
/// Callers only ever see the generic 401 message; the variant is for logs.
#[derive(Debug)]
pub enum SecurityError {
    MissingToken,
    /// `Authorization` present but not `Bearer <token>`.
    NotBearer,
    /// Undecodable token or bad signature.
    Malformed(String),
    TokenExpired,
    ClaimRejected(String),
    /// Signing or hashing failed; the only server-side variant.
    Crypto(String),
}

impl fmt::Display for SecurityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityError::MissingToken => f.write_str("no bearer token supplied"),
            SecurityError::NotBearer => f.write_str("authorization header is not a bearer credential"),
            SecurityError::Malformed(detail) => write!(f, "token rejected: {detail}"),
            SecurityError::TokenExpired => f.write_str("token has expired"),
            SecurityError::ClaimRejected(detail) => write!(f, "token claim rejected: {detail}"),
            SecurityError::Crypto(detail) => write!(f, "crypto operation failed: {detail}"),
        }
    }
}

impl std::error::Error for SecurityError {}

impl From<SecurityError> for AppError {
    fn from(err: SecurityError) -> Self {
        if let SecurityError::Crypto(detail) = err {
            return AppError::Internal(detail);
        }
        tracing::debug!(reason = %err, "authentication failed");
        AppError::not_authorized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devcamper_core::axum::http::StatusCode;

    #[test]
    fn token_failures_share_one_public_message() {
        for err in [
            SecurityError::MissingToken,
            SecurityError::NotBearer,
            SecurityError::Malformed("bad".into()),
            SecurityError::TokenExpired,
            SecurityError::ClaimRejected("iss".into()),
        ] {
            let app = AppError::from(err);
            assert_eq!(app.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(app.message(), "Not authorized to access this route");
        }
    }

    #[test]
    fn crypto_failures_are_server_errors() {
        let app = AppError::from(SecurityError::Crypto("rng".into()));
        assert_eq!(app.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
